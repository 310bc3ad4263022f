pub mod args;
pub mod input;
