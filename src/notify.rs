//! Transient notifications.
//!
//! Each notification lives through a fixed lifecycle: fully visible, then
//! a short exit window, then gone. Notifications stack freely; every push
//! is independent and there is no dedup or queueing between overlapping
//! entries.

use std::time::Instant;

use crate::config::Timings;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

/// Where a notification currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    Visible,
    Exiting,
    Expired,
}

/// A single transient notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    created: Instant,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: NotificationKind, created: Instant) -> Self {
        Self {
            message: message.into(),
            kind,
            created,
        }
    }

    /// Lifecycle phase at `now`, given the configured windows.
    #[must_use]
    pub fn phase(&self, now: Instant, timings: &Timings) -> NotificationPhase {
        let age = now.saturating_duration_since(self.created);
        if age < timings.notification_visible() {
            NotificationPhase::Visible
        } else if age < timings.notification_total() {
            NotificationPhase::Exiting
        } else {
            NotificationPhase::Expired
        }
    }
}

/// The set of currently live notifications, oldest first.
#[derive(Debug, Default)]
pub struct NotificationStack {
    entries: Vec<Notification>,
}

impl NotificationStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification created at `now`.
    pub fn push(&mut self, message: impl Into<String>, kind: NotificationKind, now: Instant) {
        self.entries.push(Notification::new(message, kind, now));
    }

    /// Drops every entry whose lifecycle has ended.
    pub fn prune(&mut self, now: Instant, timings: &Timings) {
        self.entries
            .retain(|n| n.phase(now, timings) != NotificationPhase::Expired);
    }

    /// Live entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest instant at which `prune` would drop something, if any.
    ///
    /// Lets the headless loop sleep precisely instead of polling.
    #[must_use]
    pub fn next_expiry(&self, timings: &Timings) -> Option<Instant> {
        self.entries
            .iter()
            .map(|n| n.created + timings.notification_total())
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timings() -> Timings {
        Timings::default()
    }

    #[test]
    fn phase_progression() {
        let t0 = Instant::now();
        let n = Notification::new("net restored", NotificationKind::Success, t0);
        let t = timings();

        assert_eq!(n.phase(t0, &t), NotificationPhase::Visible);
        assert_eq!(
            n.phase(t0 + Duration::from_millis(2999), &t),
            NotificationPhase::Visible
        );
        assert_eq!(
            n.phase(t0 + Duration::from_millis(3000), &t),
            NotificationPhase::Exiting
        );
        assert_eq!(
            n.phase(t0 + Duration::from_millis(3299), &t),
            NotificationPhase::Exiting
        );
        assert_eq!(
            n.phase(t0 + Duration::from_millis(3300), &t),
            NotificationPhase::Expired
        );
    }

    #[test]
    fn overlapping_entries_expire_independently() {
        let t0 = Instant::now();
        let t = timings();
        let mut stack = NotificationStack::new();
        for i in 0..5 {
            stack.push(
                format!("n{i}"),
                NotificationKind::Info,
                t0 + Duration::from_millis(i * 1000),
            );
        }
        assert_eq!(stack.len(), 5);

        // t0+3300: only the first entry has completed its lifecycle
        stack.prune(t0 + Duration::from_millis(3300), &t);
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.iter().next().unwrap().message, "n1");

        // each subsequent second retires exactly one more
        stack.prune(t0 + Duration::from_millis(4300), &t);
        assert_eq!(stack.len(), 3);
        stack.prune(t0 + Duration::from_millis(7300), &t);
        assert!(stack.is_empty());
    }

    #[test]
    fn push_n_yields_n_entries() {
        let t0 = Instant::now();
        let mut stack = NotificationStack::new();
        for _ in 0..3 {
            stack.push("same text", NotificationKind::Error, t0);
        }
        // no dedup between identical messages
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn next_expiry_is_oldest_entry() {
        let t0 = Instant::now();
        let t = timings();
        let mut stack = NotificationStack::new();
        assert_eq!(stack.next_expiry(&t), None);

        stack.push("a", NotificationKind::Info, t0 + Duration::from_secs(1));
        stack.push("b", NotificationKind::Info, t0);
        assert_eq!(
            stack.next_expiry(&t),
            Some(t0 + Duration::from_millis(3300))
        );
    }
}
