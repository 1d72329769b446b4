use std::time::Duration;

/// What the auto-advance timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    Reveal,
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    action: TimedAction,
    due_at: f64,
}

/// One-shot, cancelable timer polled from the event loop.
///
/// At most one action is pending; scheduling replaces whatever was there.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Option<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, action: TimedAction, delay: Duration, now: f64) {
        self.pending = Some(Pending {
            action,
            due_at: now + delay.as_secs_f64(),
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_action(&self) -> Option<TimedAction> {
        self.pending.map(|p| p.action)
    }

    /// Seconds until the pending action fires, if any.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pending.map(|p| (p.due_at - now).max(0.0))
    }

    /// Take the pending action once it is due.
    pub fn poll(&mut self, now: f64) -> Option<TimedAction> {
        match self.pending {
            Some(p) if now >= p.due_at => {
                self.pending = None;
                Some(p.action)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let mut s = Scheduler::new();
        s.schedule(TimedAction::Reveal, Duration::from_millis(3000), 10.0);
        assert_eq!(s.poll(12.9), None);
        assert_eq!(s.remaining(12.0), Some(1.0));
        assert_eq!(s.poll(13.0), Some(TimedAction::Reveal));
        assert_eq!(s.poll(20.0), None);
        assert!(!s.is_pending());
    }

    #[test]
    fn cancel_drops_pending_action() {
        let mut s = Scheduler::new();
        s.schedule(TimedAction::Advance, Duration::from_secs(2), 0.0);
        s.cancel();
        assert_eq!(s.poll(100.0), None);
    }

    #[test]
    fn reschedule_replaces_previous() {
        let mut s = Scheduler::new();
        s.schedule(TimedAction::Reveal, Duration::from_secs(3), 0.0);
        s.schedule(TimedAction::Advance, Duration::from_secs(2), 1.0);
        assert_eq!(s.pending_action(), Some(TimedAction::Advance));
        assert_eq!(s.poll(2.5), None);
        assert_eq!(s.poll(3.0), Some(TimedAction::Advance));
    }
}
