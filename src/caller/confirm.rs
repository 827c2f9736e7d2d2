//! Confirmation arbitration: get a yes/no from the user through an ordered
//! cascade of channels, each of which may decline to answer.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::util::first_some;
use crate::util::id::create_prompt_id;

/// How long a notification prompt waits for an interaction.
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
}

impl Prompt {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        confirm_text: impl Into<String>,
        cancel_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_text: confirm_text.into(),
            cancel_text: cancel_text.into(),
        }
    }

    /// Title and message as one block of text for plain dialogs.
    pub fn text(&self) -> String {
        if self.title.is_empty() {
            self.message.clone()
        } else {
            format!("{}\n\n{}", self.title, self.message)
        }
    }
}

/// One way of asking. `None` means the channel is unavailable or failed and
/// the next channel should be tried; it is never a "no".
pub trait ConfirmChannel: Send + Sync {
    fn name(&self) -> &'static str;
    fn confirm(&self, prompt: &Prompt) -> Option<bool>;
}

/// Tries channels in order; the first definite answer wins. With every
/// channel unavailable the answer is `false`.
#[derive(Default)]
pub struct ConfirmationArbitrator {
    channels: Vec<Box<dyn ConfirmChannel>>,
}

impl ConfirmationArbitrator {
    pub fn new(channels: Vec<Box<dyn ConfirmChannel>>) -> Self {
        Self { channels }
    }

    pub fn push(&mut self, channel: Box<dyn ConfirmChannel>) {
        self.channels.push(channel);
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn decide(&self, prompt: &Prompt) -> bool {
        first_some(&self.channels, |c| {
            let answer = c.confirm(prompt);
            tracing::debug!(channel = c.name(), answer = ?answer, "confirmation channel");
            answer
        })
        .unwrap_or_else(|| {
            tracing::warn!(title = %prompt.title, "no confirmation channel available; declining");
            false
        })
    }
}

struct PendingPrompt {
    resolve: mpsc::Sender<bool>,
    /// Dropping this wakes and ends the timeout thread.
    _timer: mpsc::Sender<()>,
}

/// Registry of notification prompts awaiting an answer, keyed by prompt id.
///
/// Button click, dismissal and timeout all race to settle an entry. Lookup and
/// removal happen under one lock, so only the first event resolves the prompt
/// and later events for the same id are no-ops.
#[derive(Clone, Default)]
pub struct PendingPrompts {
    inner: Arc<Mutex<HashMap<String, PendingPrompt>>>,
}

impl PendingPrompts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entry for `id` and arm its timeout. The returned receiver
    /// yields exactly one decision.
    pub fn register(&self, id: &str, timeout: Duration) -> mpsc::Receiver<bool> {
        let (resolve, decision) = mpsc::channel();
        let (timer, cancelled) = mpsc::channel::<()>();
        self.lock().insert(
            id.to_string(),
            PendingPrompt {
                resolve,
                _timer: timer,
            },
        );
        let registry = self.clone();
        let id = id.to_string();
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(timeout) {
                if registry.timed_out(&id) {
                    tracing::info!(prompt = %id, "prompt timed out");
                }
            }
        });
        decision
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingPrompt>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remove and resolve the entry. Returns false when it was already settled.
    fn settle(&self, id: &str, decision: bool) -> bool {
        let entry = self.lock().remove(id);
        match entry {
            Some(p) => {
                let _ = p.resolve.send(decision);
                true
            }
            None => false,
        }
    }

    /// Button 0 confirms, any other button cancels.
    pub fn button_clicked(&self, id: &str, index: usize) -> bool {
        self.settle(id, index == 0)
    }

    pub fn closed(&self, id: &str) -> bool {
        self.settle(id, false)
    }

    pub fn timed_out(&self, id: &str) -> bool {
        self.settle(id, false)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn events(&self, id: &str) -> PromptEvents {
        PromptEvents {
            registry: self.clone(),
            id: id.to_string(),
        }
    }
}

/// Handle a notifier uses to report what happened to one prompt.
#[derive(Clone)]
pub struct PromptEvents {
    registry: PendingPrompts,
    id: String,
}

impl PromptEvents {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn button_clicked(&self, index: usize) -> bool {
        self.registry.button_clicked(&self.id, index)
    }

    pub fn closed(&self) -> bool {
        self.registry.closed(&self.id)
    }
}

/// A desktop notification surface with action buttons.
pub trait Notifier: Send + Sync {
    /// Show a persistent prompt with confirm (index 0) and cancel (index 1)
    /// buttons. Interactions are reported through `events`, possibly from
    /// another thread.
    fn show_prompt(&self, id: &str, prompt: &Prompt, events: PromptEvents) -> Result<(), String>;
    fn clear(&self, id: &str);
}

/// Last channel of the cascade. Always gives a definite answer: show failures
/// and timeouts are a "no".
pub struct NotificationChannel<N> {
    notifier: N,
    registry: PendingPrompts,
    timeout: Duration,
}

impl<N: Notifier> NotificationChannel<N> {
    pub fn new(notifier: N) -> Self {
        Self::with_timeout(notifier, PROMPT_TIMEOUT)
    }

    pub fn with_timeout(notifier: N, timeout: Duration) -> Self {
        Self {
            notifier,
            registry: PendingPrompts::new(),
            timeout,
        }
    }

    pub fn registry(&self) -> &PendingPrompts {
        &self.registry
    }
}

impl<N: Notifier> ConfirmChannel for NotificationChannel<N> {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn confirm(&self, prompt: &Prompt) -> Option<bool> {
        let id = create_prompt_id();
        let decision = self.registry.register(&id, self.timeout);
        if let Err(e) = self
            .notifier
            .show_prompt(&id, prompt, self.registry.events(&id))
        {
            tracing::warn!(prompt = %id, error = %e, "failed to show notification prompt");
            self.registry.closed(&id);
            return Some(false);
        }
        let answer = decision.recv().unwrap_or(false);
        self.notifier.clear(&id);
        Some(answer)
    }
}
