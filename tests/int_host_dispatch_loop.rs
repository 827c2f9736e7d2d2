use std::io::Cursor;

mod support;
use support::{decode_frames, frames, RecordingSpawner};

use gh2ide::dispatcher::Dispatcher;
use gh2ide::launcher::Launcher;
use gh2ide::picker::{DirectoryPicker, PickOutcome};
use gh2ide::{FrameError, HostError};
use serde_json::json;

struct CancelPicker;

impl DirectoryPicker for CancelPicker {
    fn pick(&self) -> Result<PickOutcome, HostError> {
        Ok(PickOutcome::Cancelled)
    }
}

fn dispatcher() -> Dispatcher<RecordingSpawner, CancelPicker> {
    Dispatcher::new(Launcher::new(RecordingSpawner::default()), CancelPicker)
}

#[test]
fn int_loop_answers_each_frame_and_survives_errors() {
    let input = frames(&[
        json!({"action": "frobnicate"}),
        json!({"action": "ping"}),
        json!({"noAction": true}),
        json!({"action": "chooseCloneRoot"}),
        json!({"action": "clone", "remote": "", "localPath": "/tmp/x"}),
    ]);
    let mut out = Vec::new();
    let handled = dispatcher()
        .serve(Cursor::new(input), &mut out)
        .expect("clean end of stream");
    assert_eq!(handled, 5);

    let replies = decode_frames(&out);
    assert_eq!(replies.len(), 5, "one response per request");
    assert_eq!(
        replies[0],
        json!({"status": "ERROR", "message": "unknown action: frobnicate"})
    );
    assert_eq!(replies[1]["status"], "PONG");
    assert_eq!(replies[1]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(
        replies[2],
        json!({"status": "ERROR", "message": "unknown action: "})
    );
    assert_eq!(replies[3], json!({"status": "CANCELLED"}));
    assert_eq!(
        replies[4],
        json!({"status": "ERROR", "message": "clone requires remote and localPath"})
    );
}

#[test]
fn int_bad_fields_become_error_responses() {
    let input = frames(&[
        json!({"action": "resolve", "owner": 7}),
        json!({"action": "switchBranch", "localPath": "/tmp/x", "branch": "  "}),
    ]);
    let mut out = Vec::new();
    dispatcher().serve(Cursor::new(input), &mut out).unwrap();
    let replies = decode_frames(&out);
    assert_eq!(replies[0]["status"], "ERROR");
    let msg = replies[0]["message"].as_str().unwrap_or_default();
    assert!(msg.starts_with("invalid resolve request:"), "{msg}");
    assert_eq!(
        replies[1],
        json!({"status": "ERROR", "message": "switchBranch requires a branch"})
    );
}

#[test]
fn int_truncated_frame_ends_loop_with_error() {
    let mut input = frames(&[json!({"action": "ping"})]);
    input.extend_from_slice(&100u32.to_le_bytes());
    input.extend_from_slice(b"{\"act");
    let mut out = Vec::new();
    let err = dispatcher()
        .serve(Cursor::new(input), &mut out)
        .expect_err("truncated body");
    assert!(matches!(err, FrameError::ShortRead { expected: 100, got: 5 }));
    // The complete frame before the fault was still answered.
    assert_eq!(decode_frames(&out).len(), 1);
}

#[test]
fn int_empty_input_handles_nothing() {
    let mut out = Vec::new();
    let handled = dispatcher()
        .serve(Cursor::new(Vec::new()), &mut out)
        .unwrap();
    assert_eq!(handled, 0);
    assert!(out.is_empty());
}
