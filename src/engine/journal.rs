//! Activity log shown under the trade form.
//!
//! Newest entry first; once the cap is reached the oldest entry drops off.

use std::collections::VecDeque;

use crate::types::{LogEntry, LogStyle};

#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    cap: usize,
}

impl ActivityLog {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap + 1),
            cap: cap.max(1),
        }
    }

    /// Prepend an entry and trim to the cap.
    pub fn record(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.cap);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(LogEntry::new(message, LogStyle::Info));
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut log = ActivityLog::new(10);
        log.info("first");
        log.info("second");
        let entries = log.entries();
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
        assert_eq!(log.latest().unwrap().message, "second");
    }

    #[test]
    fn test_eleven_events_keep_ten_most_recent() {
        let mut log = ActivityLog::new(10);
        for i in 1..=11 {
            log.info(format!("event {i}"));
        }
        assert_eq!(log.len(), 10);
        let entries = log.entries();
        assert_eq!(entries[0].message, "event 11");
        assert_eq!(entries[9].message, "event 2");
        assert!(entries.iter().all(|e| e.message != "event 1"));
    }

    #[test]
    fn test_never_exceeds_cap() {
        let mut log = ActivityLog::new(3);
        for i in 0..100 {
            log.record(LogEntry::new(format!("{i}"), LogStyle::Loss));
            assert!(log.len() <= 3);
        }
        assert_eq!(log.cap(), 3);
    }

    #[test]
    fn test_empty() {
        let log = ActivityLog::new(10);
        assert!(log.is_empty());
        assert!(log.latest().is_none());
    }
}
