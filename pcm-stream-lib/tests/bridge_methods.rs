mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::ManualSink;
use pcm_stream_lib::audio::samples::encode_le_bytes;
use pcm_stream_lib::bridge::method::{INVALID_ARGUMENTS, INVALID_STATE};
use pcm_stream_lib::bridge::StreamingAudioPlugin;
use pcm_stream_lib::error::PlayerError;
use pcm_stream_lib::playback::player::{PlayerSettings, PlayerState};
use pcm_stream_lib::playback::sink::OutputSink;
use serde_json::{json, Value};

fn plugin_with(sink: ManualSink) -> StreamingAudioPlugin {
    StreamingAudioPlugin::with_sink_factory(
        PlayerSettings::default(),
        Box::new(
            move |_: u32, _: &PlayerSettings| -> Result<Box<dyn OutputSink>, PlayerError> {
                Ok(sink.boxed())
            },
        ),
    )
}

#[test]
fn double_initialize_keeps_first_player() {
    let plugin = plugin_with(ManualSink::new());
    plugin.initialize_audio_player(24_000.0, 1).unwrap();

    let err = plugin.initialize_audio_player(48_000.0, 1).unwrap_err();
    assert!(matches!(err, PlayerError::InvalidArguments(_)));
    assert_eq!(plugin.sample_rate(), Some(24_000));
}

#[test]
fn operations_without_player() {
    let plugin = plugin_with(ManualSink::new());
    plugin.start_playback();
    plugin.stop_playback();
    plugin.destroy_audio_player();
    plugin.add_audio_data(&[0, 0]).unwrap();
    assert_eq!(plugin.player_state(), PlayerState::Uninitialized);
    assert!(plugin.progress().is_none());

    let err = plugin.stream_complete().unwrap_err();
    assert_eq!(
        err,
        PlayerError::InvalidState("No audio player available".to_string())
    );
}

#[test]
fn malformed_initialize_leaves_slot_empty() {
    let plugin = plugin_with(ManualSink::new());
    assert!(plugin.initialize_audio_player(f64::INFINITY, 1).is_err());
    assert!(plugin.initialize_audio_player(24_000.0, 0).is_err());
    assert_eq!(plugin.player_state(), PlayerState::Uninitialized);
    plugin.initialize_audio_player(24_000.0, 2).unwrap();
    assert_eq!(plugin.player_state(), PlayerState::Ready);
}

#[test]
fn device_failure_is_reported() {
    let plugin = StreamingAudioPlugin::with_sink_factory(
        PlayerSettings::default(),
        Box::new(
            |_: u32, _: &PlayerSettings| -> Result<Box<dyn OutputSink>, PlayerError> {
                Err(PlayerError::Device("no output device".to_string()))
            },
        ),
    );
    let err = plugin.initialize_audio_player(24_000.0, 1).unwrap_err();
    assert!(matches!(err, PlayerError::Device(_)));
    assert!(plugin.current_player().is_none());
}

#[test]
fn byte_stream_plays_to_completion() {
    let sink = ManualSink::auto_completing();
    let plugin = plugin_with(sink.clone());
    plugin.initialize_audio_player(16_000.0, 1).unwrap();

    let samples: Vec<i16> = (0..4_000).map(|i| (i * 7) as i16).collect();
    for chunk in samples.chunks(640) {
        plugin.add_audio_data(&encode_le_bytes(chunk)).unwrap();
    }
    assert!(plugin.add_audio_data(&[1]).is_err());

    plugin.start_playback();
    assert_eq!(plugin.player_state(), PlayerState::Playing);
    plugin.stream_complete().unwrap();

    let progress = plugin.progress().unwrap();
    assert_eq!(progress.submitted, 4_000);
    assert_eq!(progress.played, 4_000);
    assert_eq!(sink.submitted().iter().map(Vec::len).sum::<usize>(), 4_000);

    plugin.stop_playback();
    assert_eq!(plugin.player_state(), PlayerState::Stopped);
    plugin.destroy_audio_player();
    plugin.destroy_audio_player();
    assert_eq!(plugin.player_state(), PlayerState::Uninitialized);
}

#[test]
fn destroy_during_stream_complete_aborts_wait() {
    let sink = ManualSink::new();
    let plugin = Arc::new(plugin_with(sink.clone()));
    plugin.initialize_audio_player(8_000.0, 1).unwrap();
    plugin.add_audio_data(&encode_le_bytes(&[3; 800])).unwrap();
    plugin.start_playback();
    assert!(sink.wait_for_submitted(1, Duration::from_secs(2)));

    let waiter = plugin.clone();
    let handle = std::thread::spawn(move || waiter.stream_complete());
    std::thread::sleep(Duration::from_millis(30));
    plugin.destroy_audio_player();

    assert_eq!(handle.join().unwrap(), Err(PlayerError::Aborted));
}

#[test]
fn reinitialize_after_destroy_builds_new_sink() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let plugin = StreamingAudioPlugin::with_sink_factory(
        PlayerSettings::default(),
        Box::new(
            move |_: u32, _: &PlayerSettings| -> Result<Box<dyn OutputSink>, PlayerError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ManualSink::new().boxed())
            },
        ),
    );

    plugin.initialize_audio_player(24_000.0, 1).unwrap();
    plugin.destroy_audio_player();
    plugin.initialize_audio_player(44_100.0, 1).unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert_eq!(plugin.sample_rate(), Some(44_100));
}

#[test]
fn method_calls_drive_full_session() {
    let sink = ManualSink::auto_completing();
    let plugin = plugin_with(sink.clone());

    let result = plugin.handle_method_call(
        "initializeAudioPlayer",
        &json!({"sampleRate": 24000.0, "channels": 1}),
    );
    assert_eq!(result, Ok(Value::Null));

    let bytes = encode_le_bytes(&vec![0_i16; 2_400]);
    plugin
        .handle_method_call("addAudioData", &json!({ "audioData": bytes }))
        .unwrap();
    plugin.handle_method_call("startPlayback", &Value::Null).unwrap();
    plugin.handle_method_call("streamComplete", &Value::Null).unwrap();
    assert_eq!(sink.submitted_count(), 1);

    plugin.handle_method_call("stopPlayback", &Value::Null).unwrap();
    plugin
        .handle_method_call("destroyAudioPlayer", &Value::Null)
        .unwrap();
    assert_eq!(plugin.player_state(), PlayerState::Uninitialized);
}

#[test]
fn method_call_errors_carry_codes() {
    let plugin = plugin_with(ManualSink::new());

    let err = plugin
        .handle_method_call("initializeAudioPlayer", &json!({"sampleRate": 24000.0}))
        .unwrap_err();
    assert_eq!(err.code, INVALID_ARGUMENTS);
    assert_eq!(err.message, "Invalid arguments for initializeAudioPlayer");

    let err = plugin
        .handle_method_call("streamComplete", &Value::Null)
        .unwrap_err();
    assert_eq!(err.code, INVALID_STATE);

    let err = plugin.handle_method_call("seek", &Value::Null).unwrap_err();
    assert_eq!(err.message, "Unknown method seek");

    plugin
        .handle_method_call(
            "initializeAudioPlayer",
            &json!({"sampleRate": 24000.0, "channels": 1}),
        )
        .unwrap();
    let err = plugin
        .handle_method_call(
            "initializeAudioPlayer",
            &json!({"sampleRate": 24000.0, "channels": 1}),
        )
        .unwrap_err();
    assert_eq!(
        err.message,
        "An AudioPlayer instance already exists, call destroyAudioPlayer"
    );

    let err = plugin
        .handle_method_call("addAudioData", &json!({"audioData": [1, 2, 3]}))
        .unwrap_err();
    assert_eq!(err.code, INVALID_ARGUMENTS);

    let err = plugin
        .handle_method_call("addAudioData", &json!({"samples": [1, 2]}))
        .unwrap_err();
    assert_eq!(err.message, "Invalid arguments for addAudioData");
}
