use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use gh2ide::caller::intercept::{CLONE_OPEN_FAILED, NO_RESPONSE};
use gh2ide::caller::{
    ConfirmChannel, ConfirmationArbitrator, FollowUp, Handled, HostTransport, InterceptOptions,
    InterceptOutcome, Interceptor, NoticeSink, Prompt, SkipReason,
};
use gh2ide::protocol::{HostRequest, HostResponse, OpenPayload};
use gh2ide::{CallerSettings, HostConfig, OpenMode};
use serde_json::json;

/// Replays scripted responses and records every request.
#[derive(Default)]
struct ScriptedHost {
    replies: RefCell<VecDeque<Option<HostResponse>>>,
    sent: RefCell<Vec<HostRequest>>,
}

impl ScriptedHost {
    fn new(replies: Vec<Option<HostResponse>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            sent: RefCell::new(Vec::new()),
        }
    }

    fn actions(&self) -> Vec<&'static str> {
        self.sent.borrow().iter().map(HostRequest::action).collect()
    }
}

impl HostTransport for ScriptedHost {
    fn send(&self, request: &HostRequest) -> Option<HostResponse> {
        self.sent.borrow_mut().push(request.clone());
        self.replies.borrow_mut().pop_front().flatten()
    }
}

#[derive(Clone, Default)]
struct Notices(Rc<RefCell<Vec<String>>>);

impl NoticeSink for Notices {
    fn notice(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

type Prompts = Arc<Mutex<Vec<Prompt>>>;

struct Answer(bool, Prompts);

impl ConfirmChannel for Answer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn confirm(&self, prompt: &Prompt) -> Option<bool> {
        self.1.lock().unwrap().push(prompt.clone());
        Some(self.0)
    }
}

fn settings() -> CallerSettings {
    CallerSettings::from_value(&json!({"cloneRoot": "/src", "autoOpen": true}))
}

fn interceptor(
    replies: Vec<Option<HostResponse>>,
    answer: bool,
) -> (Interceptor<ScriptedHost, Notices>, Notices, Prompts) {
    let notices = Notices::default();
    let prompts = Prompts::default();
    let channel: Box<dyn ConfirmChannel> = Box::new(Answer(answer, prompts.clone()));
    let arb = ConfirmationArbitrator::new(vec![channel]);
    let i = Interceptor::new(settings(), arb, ScriptedHost::new(replies), notices.clone());
    (i, notices, prompts)
}

fn deferred_open() -> HostRequest {
    HostRequest::Open(OpenPayload {
        local_path: PathBuf::from("/src/widgets"),
        file_path: Some("README.md".into()),
        line_number: Some(3),
        editor_id: Some("code".into()),
        open_mode: Some(OpenMode::Repo),
        config: HostConfig::default(),
    })
}

fn opened() -> Option<HostResponse> {
    Some(HostResponse::Opened {
        local_path: Some(PathBuf::from("/src/widgets")),
        editor_id: Some("code".into()),
    })
}

const URL: &str = "https://github.com/acme/widgets/blob/main/README.md#L3";

#[test]
fn int_resolve_carries_location_and_editor() {
    let (mut i, notices, _) = interceptor(vec![opened()], true);
    let out = i.intercept(URL, &InterceptOptions::default());
    assert_eq!(
        out,
        InterceptOutcome::Handled {
            result: Handled::Opened,
            editor_id: "code".into(),
            open_mode: OpenMode::Repo,
        }
    );
    let sent = i.transport().sent.borrow();
    match &sent[0] {
        HostRequest::Resolve(r) => {
            assert_eq!(r.owner, "acme");
            assert_eq!(r.repo, "widgets");
            assert_eq!(r.git_ref.as_deref(), Some("main"));
            assert_eq!(r.file_path.as_deref(), Some("README.md"));
            assert_eq!(r.line_number, Some(3));
            assert_eq!(r.config.clone_root, "/src");
        }
        other => panic!("expected resolve, got {other:?}"),
    }
    assert!(notices.0.borrow().is_empty());
}

#[test]
fn int_confirmed_clone_then_reopen() {
    let (mut i, notices, prompts) = interceptor(
        vec![
            Some(HostResponse::NeedsClone {
                remote: "https://github.com/acme/widgets.git".into(),
                local_path: PathBuf::from("/src/widgets"),
                open_payload: deferred_open(),
            }),
            Some(HostResponse::Cloned {
                local_path: Some(PathBuf::from("/src/widgets")),
                already_present: false,
            }),
            opened(),
        ],
        true,
    );
    let out = i.intercept(URL, &InterceptOptions::default());
    assert!(matches!(
        out,
        InterceptOutcome::Handled {
            result: Handled::NeedsClone(FollowUp::Completed),
            ..
        }
    ));
    assert_eq!(i.transport().actions(), vec!["resolve", "clone", "open"]);
    assert_eq!(i.transport().sent.borrow()[2], deferred_open());

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts[0].title, "Clone repository?");
    assert_eq!(
        prompts[0].message,
        "Clone https://github.com/acme/widgets.git to /src/widgets?"
    );
    assert!(notices.0.borrow().is_empty());
}

#[test]
fn int_declined_clone_sends_nothing_more() {
    let (mut i, _, _) = interceptor(
        vec![Some(HostResponse::NeedsClone {
            remote: "r".into(),
            local_path: PathBuf::from("/src/widgets"),
            open_payload: deferred_open(),
        })],
        false,
    );
    let out = i.intercept(URL, &InterceptOptions::default());
    assert!(matches!(
        out,
        InterceptOutcome::Handled {
            result: Handled::NeedsClone(FollowUp::Declined),
            ..
        }
    ));
    assert_eq!(i.transport().actions(), vec!["resolve"]);
}

#[test]
fn int_clone_success_but_open_failure_notifies() {
    let (mut i, notices, _) = interceptor(
        vec![
            Some(HostResponse::NeedsClone {
                remote: "r".into(),
                local_path: PathBuf::from("/src/widgets"),
                open_payload: deferred_open(),
            }),
            Some(HostResponse::Cloned {
                local_path: None,
                already_present: true,
            }),
            Some(HostResponse::error("Editor command not found: code")),
        ],
        true,
    );
    let out = i.intercept(URL, &InterceptOptions::default());
    assert!(matches!(
        out,
        InterceptOutcome::Handled {
            result: Handled::NeedsClone(FollowUp::OpenFailed),
            ..
        }
    ));
    assert_eq!(*notices.0.borrow(), vec![CLONE_OPEN_FAILED.to_string()]);
}

#[test]
fn int_switch_failure_surfaces_git_message() {
    let (mut i, notices, prompts) = interceptor(
        vec![
            Some(HostResponse::WrongBranch {
                current_branch: "main".into(),
                expected_branch: "dev".into(),
                local_path: PathBuf::from("/src/widgets"),
                open_payload: deferred_open(),
            }),
            Some(HostResponse::error("your local changes would be overwritten")),
        ],
        true,
    );
    let out = i.intercept(URL, &InterceptOptions::default());
    assert!(matches!(
        out,
        InterceptOutcome::Handled {
            result: Handled::WrongBranch(FollowUp::Failed(_)),
            ..
        }
    ));
    assert_eq!(i.transport().actions(), vec!["resolve", "switchBranch"]);
    assert_eq!(
        prompts.lock().unwrap()[0].message,
        "Repo is on \"main\" but URL requests \"dev\". Switch branches?"
    );
    assert_eq!(
        *notices.0.borrow(),
        vec!["Branch switch failed: your local changes would be overwritten".to_string()]
    );
}

#[test]
fn int_host_error_and_silence_are_reported() {
    let (mut i, notices, _) = interceptor(
        vec![Some(HostResponse::error("Local repo path not found: /x")), None],
        true,
    );
    let first = i.intercept(URL, &InterceptOptions::forced());
    assert!(matches!(
        first,
        InterceptOutcome::Handled {
            result: Handled::Error(_),
            ..
        }
    ));
    let second = i.intercept(URL, &InterceptOptions::forced());
    assert!(matches!(
        second,
        InterceptOutcome::Handled {
            result: Handled::NoResponse,
            ..
        }
    ));
    assert_eq!(
        *notices.0.borrow(),
        vec![
            "Local repo path not found: /x".to_string(),
            NO_RESPONSE.to_string()
        ]
    );
}

#[test]
fn int_gate_skips_before_contacting_host() {
    let (mut i, _, _) = interceptor(vec![opened(), opened()], true);
    assert_eq!(
        i.intercept("https://example.com/acme/widgets", &InterceptOptions::default()),
        InterceptOutcome::Skipped(SkipReason::NotHosted)
    );
    assert_eq!(
        i.intercept("https://github.com/acme", &InterceptOptions::default()),
        InterceptOutcome::Skipped(SkipReason::MissingRepo)
    );
    assert!(matches!(
        i.intercept(URL, &InterceptOptions::default()),
        InterceptOutcome::Handled { .. }
    ));
    assert_eq!(
        i.intercept(URL, &InterceptOptions::default()),
        InterceptOutcome::Skipped(SkipReason::Duplicate)
    );
    assert_eq!(i.transport().actions(), vec!["resolve"]);

    i.gate().set_auto_open(false);
    assert_eq!(
        i.intercept(URL, &InterceptOptions::default()),
        InterceptOutcome::Skipped(SkipReason::AutoOpenDisabled)
    );
}

#[test]
fn int_remembered_editor_marks_settings_dirty() {
    let (mut i, _, _) = interceptor(vec![opened(), opened()], true);
    let opts = InterceptOptions {
        editor_id: Some("rider".into()),
        remember_editor: true,
        open_mode: Some(OpenMode::File),
        ..InterceptOptions::forced()
    };
    let out = i.intercept(URL, &opts);
    assert_eq!(
        out,
        InterceptOutcome::Handled {
            result: Handled::Opened,
            editor_id: "rider".into(),
            open_mode: OpenMode::File,
        }
    );
    assert!(i.take_settings_dirty());
    assert!(!i.take_settings_dirty());
    assert_eq!(
        i.settings().editor_for_repo("acme", "widgets").as_deref(),
        Some("rider")
    );

    // Later automatic opens pick the remembered editor.
    let out = i.intercept(
        "https://github.com/acme/widgets",
        &InterceptOptions::forced(),
    );
    assert!(matches!(
        out,
        InterceptOutcome::Handled { ref editor_id, .. } if editor_id == "rider"
    ));
}
