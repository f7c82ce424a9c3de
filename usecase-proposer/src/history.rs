//! Run history store
//!
//! Session-scoped, append-only list of completed runs. Records are
//! immutable once appended and live for the process session; the store is
//! passed by reference to whichever component needs it, never kept in an
//! ambient global.

use chrono::{DateTime, Local};

/// One completed invocation's metadata and result
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// Monotonically increasing sequence id, unique within the session
    pub seq: u64,
    pub company: String,
    pub timestamp: DateTime<Local>,
    pub duration_secs: f64,
    pub result: String,
}

/// Ordered history of past runs plus the currently displayed selection
#[derive(Debug, Default)]
pub struct RunHistory {
    runs: Vec<RunRecord>,
    next_seq: u64,
    selected: Option<u64>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for a completed run and return it
    pub fn record(&mut self, company: &str, result: &str, duration_secs: f64) -> &RunRecord {
        let record = RunRecord {
            seq: self.next_seq,
            company: company.to_string(),
            timestamp: Local::now(),
            duration_secs: duration_secs.max(0.0),
            result: result.to_string(),
        };
        self.next_seq += 1;
        self.runs.push(record);
        self.runs.last().expect("just pushed")
    }

    /// The last `n` records, most recent first
    pub fn recent(&self, n: usize) -> Vec<&RunRecord> {
        self.runs.iter().rev().take(n).collect()
    }

    /// Move the currently-displayed pointer; false when the id is unknown
    pub fn select(&mut self, seq: u64) -> bool {
        if self.runs.iter().any(|r| r.seq == seq) {
            self.selected = Some(seq);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&RunRecord> {
        let seq = self.selected?;
        self.runs.iter().find(|r| r.seq == seq)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_assigns_increasing_sequence_ids() {
        let mut history = RunHistory::new();
        let first = history.record("Tesla", "result a", 1.5).seq;
        let second = history.record("Netflix", "result b", 2.0).seq;
        assert!(second > first);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn negative_duration_is_clamped_to_zero() {
        let mut history = RunHistory::new();
        let rec = history.record("Acme", "r", -3.0);
        assert!(rec.duration_secs >= 0.0);
    }

    #[test]
    fn recent_is_capped_and_newest_first() {
        let mut history = RunHistory::new();
        for i in 0..7 {
            history.record(&format!("Company {}", i), "r", 0.1);
        }

        let recent = history.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].company, "Company 6");
        assert_eq!(recent[4].company, "Company 2");
    }

    #[test]
    fn recent_is_idempotent_without_intervening_record() {
        let mut history = RunHistory::new();
        history.record("Tesla", "r", 0.1);
        history.record("Netflix", "r", 0.2);

        let first: Vec<u64> = history.recent(5).iter().map(|r| r.seq).collect();
        let second: Vec<u64> = history.recent(5).iter().map(|r| r.seq).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn select_moves_the_displayed_pointer() {
        let mut history = RunHistory::new();
        let seq = history.record("Tesla", "tesla result", 0.1).seq;
        history.record("Netflix", "netflix result", 0.2);

        assert!(history.select(seq));
        assert_eq!(history.selected().unwrap().company, "Tesla");

        assert!(!history.select(999));
        // Failed select leaves the pointer untouched
        assert_eq!(history.selected().unwrap().seq, seq);

        history.clear_selection();
        assert!(history.selected().is_none());
    }
}
