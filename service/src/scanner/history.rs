//! [`History`] of accepted scans.

use std::collections::{vec_deque, VecDeque};

use crate::domain::ScanEvent;

/// Bounded history of [`ScanEvent`]s, most recent first.
#[derive(Clone, Debug)]
pub struct History {
    /// Recorded [`ScanEvent`]s, most recent first.
    events: VecDeque<ScanEvent>,

    /// Maximum number of kept [`ScanEvent`]s.
    limit: usize,
}

impl History {
    /// Creates a new empty [`History`] keeping at most `limit` events.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Records the provided [`ScanEvent`], evicting the oldest one if the
    /// limit is exceeded.
    pub fn record(&mut self, event: ScanEvent) {
        self.events.push_front(event);
        self.events.truncate(self.limit);
    }

    /// Returns the most recent [`ScanEvent`], if any.
    #[must_use]
    pub fn latest(&self) -> Option<&ScanEvent> {
        self.events.front()
    }

    /// Iterates over the recorded [`ScanEvent`]s, most recent first.
    pub fn iter(&self) -> vec_deque::Iter<'_, ScanEvent> {
        self.events.iter()
    }

    /// Returns the number of recorded [`ScanEvent`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Indicates whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'h> IntoIterator for &'h History {
    type Item = &'h ScanEvent;
    type IntoIter = vec_deque::Iter<'h, ScanEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{
        attendance::{ScannedAt, Status},
        user, ScanEvent,
    };

    use super::History;

    fn event(id: u64) -> ScanEvent {
        ScanEvent {
            identity_id: user::Id::new(id).unwrap(),
            identity_name: format!("Student {id}"),
            status: Status::Present,
            scanned_at: ScannedAt::UNIX_EPOCH,
            scan_time: None,
        }
    }

    #[test]
    fn keeps_most_recent_first_within_limit() {
        let mut history = History::new(20);
        for id in 1..=25 {
            history.record(event(id));
        }

        assert_eq!(history.len(), 20);
        assert_eq!(history.latest().unwrap().identity_id.get(), 25);
        let ids = history
            .iter()
            .map(|e| e.identity_id.get())
            .collect::<Vec<_>>();
        assert_eq!(ids, (6..=25).rev().collect::<Vec<_>>());
    }

    #[test]
    fn zero_limit_keeps_nothing() {
        let mut history = History::new(0);
        history.record(event(1));

        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
