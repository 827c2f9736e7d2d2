//! Request gate: decide whether an intercepted navigation should reach the host.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Identical automatic triggers inside this window are duplicates.
pub const DEDUPE_WINDOW: Duration = Duration::from_secs(1);
/// Admitted entries are forgotten after this long.
pub const DEDUPE_RETENTION: Duration = Duration::from_secs(2);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Navigation events and link clicks.
    Automatic,
    /// Explicit user action from a UI control.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotHosted,
    AutoOpenDisabled,
    Duplicate,
    MissingRepo,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotHosted => "notHosted",
            SkipReason::AutoOpenDisabled => "autoOpenDisabled",
            SkipReason::Duplicate => "duplicate",
            SkipReason::MissingRepo => "missingRepo",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form used for de-duplication. Unparseable input is used as-is.
pub fn normalize_url(raw: &str) -> String {
    match url::Url::parse(raw.trim()) {
        Ok(u) => u.to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

pub struct RequestGate<C = SystemClock> {
    auto_open: AtomicBool,
    recent: Mutex<HashMap<(String, String), Instant>>,
    window: Duration,
    retention: Duration,
    clock: C,
}

impl RequestGate<SystemClock> {
    pub fn new(auto_open: bool) -> Self {
        Self::with_clock(auto_open, SystemClock)
    }
}

impl<C: Clock> RequestGate<C> {
    pub fn with_clock(auto_open: bool, clock: C) -> Self {
        Self {
            auto_open: AtomicBool::new(auto_open),
            recent: Mutex::new(HashMap::new()),
            window: DEDUPE_WINDOW,
            retention: DEDUPE_RETENTION,
            clock,
        }
    }

    pub fn set_auto_open(&self, enabled: bool) {
        self.auto_open.store(enabled, Ordering::SeqCst);
    }

    pub fn auto_open(&self) -> bool {
        self.auto_open.load(Ordering::SeqCst)
    }

    /// Admit or reject one trigger. Forced triggers are always admitted and
    /// leave no de-duplication entry.
    pub fn admit(&self, tab: Option<&str>, url: &str, trigger: Trigger) -> Result<(), SkipReason> {
        if trigger == Trigger::Forced {
            return Ok(());
        }
        if !self.auto_open() {
            return Err(SkipReason::AutoOpenDisabled);
        }
        let now = self.clock.now();
        let key = (tab.unwrap_or("no-tab").to_string(), normalize_url(url));
        let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        recent.retain(|_, at| now.saturating_duration_since(*at) < self.retention);
        if let Some(at) = recent.get(&key) {
            if now.saturating_duration_since(*at) < self.window {
                tracing::debug!(tab = %key.0, url = %key.1, "duplicate trigger skipped");
                return Err(SkipReason::Duplicate);
            }
        }
        recent.insert(key, now);
        Ok(())
    }

    /// Live de-duplication entries (after eviction at the last admit).
    pub fn tracked(&self) -> usize {
        self.recent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_canonicalizes_host_case() {
        assert_eq!(
            normalize_url("https://GitHub.com/acme/widgets"),
            "https://github.com/acme/widgets"
        );
        assert_eq!(normalize_url("not a url"), "not a url");
    }

    #[test]
    fn disabled_toggle_rejects_automatic_only() {
        let gate = RequestGate::new(false);
        assert_eq!(
            gate.admit(Some("1"), "https://github.com/a/b", Trigger::Automatic),
            Err(SkipReason::AutoOpenDisabled)
        );
        assert_eq!(gate.admit(Some("1"), "https://github.com/a/b", Trigger::Forced), Ok(()));
        gate.set_auto_open(true);
        assert_eq!(
            gate.admit(Some("1"), "https://github.com/a/b", Trigger::Automatic),
            Ok(())
        );
    }
}
