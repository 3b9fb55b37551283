use std::time::{Duration, Instant};

use crate::io::watcher::StoreEvent;

/// Default delay between the last change notification and the refresh
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default time notifications stay ignored after a move settles
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    due: Instant,
    explicit: bool,
}

/// Decides when the board should be rebuilt.
///
/// Bursts of change notifications collapse into one debounced refresh.
/// While a move is in flight, and for a settle interval afterwards,
/// notifications are ignored so the move's own write does not trigger an
/// intermediate refresh. This is an advisory window, not a lock.
///
/// Time is passed in by the caller; the coordinator never reads the clock.
#[derive(Debug, Clone)]
pub struct RefreshCoordinator {
    debounce: Duration,
    settle: Duration,
    pending: Option<Pending>,
    in_flight: bool,
    suppressed_until: Option<Instant>,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        RefreshCoordinator::new(DEFAULT_DEBOUNCE, DEFAULT_SETTLE)
    }
}

impl RefreshCoordinator {
    pub fn new(debounce: Duration, settle: Duration) -> Self {
        RefreshCoordinator {
            debounce,
            settle,
            pending: None,
            in_flight: false,
            suppressed_until: None,
        }
    }

    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.in_flight || self.suppressed_until.is_some_and(|until| now < until)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// An external change notification. Returns whether it scheduled a refresh.
    pub fn notify(&mut self, event: &StoreEvent, now: Instant) -> bool {
        if self.is_suppressed(now) {
            tracing::debug!(?event, "change ignored while a move settles");
            return false;
        }
        let due = now + self.debounce;
        self.pending = Some(match self.pending {
            // an explicit refresh keeps its earlier slot
            Some(p) if p.explicit && p.due <= due => p,
            _ => Pending {
                due,
                explicit: false,
            },
        });
        tracing::debug!(?event, "refresh scheduled");
        true
    }

    /// Explicit refresh: due immediately, regardless of debounce or
    /// suppression.
    pub fn request_refresh(&mut self, now: Instant) {
        self.pending = Some(Pending {
            due: now,
            explicit: true,
        });
    }

    pub fn begin_mutation(&mut self) {
        self.in_flight = true;
    }

    /// The move settled at `now`; notifications stay ignored until
    /// `now + settle`.
    pub fn end_mutation(&mut self, now: Instant) {
        self.in_flight = false;
        self.suppressed_until = Some(now + self.settle);
    }

    /// True exactly once per scheduled refresh, when it is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.due => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending refresh
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
