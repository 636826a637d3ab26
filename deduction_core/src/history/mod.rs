//! History correlator - matches asynchronous results back to their questions.
//!
//! A question is registered as pending when it is asked and promoted to a
//! committed [`DialogueRecord`] when its result arrives. Pending entries are
//! keyed by question text alone, so identical text asked about a second clue
//! while the first is outstanding is ignored.

mod record;

pub use record::*;

use case_rules::{ClueId, EvaluationResult};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A question awaiting its result.
#[derive(Debug, Clone)]
struct PendingQuestion {
    clue_id: ClueId,
    registered_at: Instant,
}

/// Pending questions plus the committed per-clue audit log.
#[derive(Debug, Default)]
pub struct HistoryCorrelator {
    /// Question text -> clue it was asked about.
    pending: HashMap<String, PendingQuestion>,

    /// Clue -> committed records in insertion order.
    committed: HashMap<ClueId, Vec<DialogueRecord>>,
}

impl HistoryCorrelator {
    /// Create an empty correlator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `question` as awaiting a result for `clue_id`.
    ///
    /// Returns `false` and changes nothing if the same text is already pending.
    pub fn register_pending(&mut self, clue_id: ClueId, question: impl Into<String>) -> bool {
        let question = question.into();

        if let Some(existing) = self.pending.get(&question) {
            debug!(
                "'{}' already pending for clue '{}'; ignoring registration for '{}'",
                question, existing.clue_id, clue_id
            );
            return false;
        }

        debug!("'{}' queued as pending for clue '{}'", question, clue_id);
        self.pending.insert(
            question,
            PendingQuestion {
                clue_id,
                registered_at: Instant::now(),
            },
        );
        true
    }

    /// Promote the pending `question` to a committed record.
    ///
    /// Without a matching registration the result is dropped and `None` is returned.
    pub fn commit(&mut self, question: &str, result: EvaluationResult) -> Option<&DialogueRecord> {
        let Some(pending) = self.pending.remove(question) else {
            warn!("Result for '{}' arrived with no pending registration; dropped", question);
            return None;
        };

        info!(
            "'{}' recorded under clue '{}' as {}",
            question,
            pending.clue_id,
            result.verdict()
        );

        let record = DialogueRecord::new(pending.clue_id.clone(), question.to_string(), result);
        let bucket = self.committed.entry(pending.clue_id).or_default();
        bucket.push(record);
        bucket.last()
    }

    /// Committed records for a clue, oldest first.
    pub fn records_for_clue(&self, clue_id: &ClueId) -> &[DialogueRecord] {
        self.committed
            .get(clue_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Remove exactly this record from its clue's log.
    pub fn delete_record(&mut self, record: &DialogueRecord) -> bool {
        let Some(records) = self.committed.get_mut(&record.clue_id) else {
            return false;
        };

        match records.iter().position(|r| r.id == record.id) {
            Some(pos) => {
                records.remove(pos);
                info!(
                    "Deleted record '{}' from clue '{}'",
                    record.question, record.clue_id
                );
                true
            }
            None => false,
        }
    }

    /// Remove every committed record for a clue.
    pub fn delete_clue_history(&mut self, clue_id: &ClueId) -> bool {
        let removed = self.committed.remove(clue_id).is_some();
        if removed {
            info!("All records for clue '{}' deleted", clue_id);
        }
        removed
    }

    /// Clear both pending and committed state.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.committed.clear();
        info!("Dialogue history cleared");
    }

    pub fn is_pending(&self, question: &str) -> bool {
        self.pending.contains_key(question)
    }

    /// Clue a pending question was registered for.
    pub fn pending_clue(&self, question: &str) -> Option<&ClueId> {
        self.pending.get(question).map(|p| &p.clue_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Abandon a pending question so a later result for it is dropped.
    pub fn cancel_pending(&mut self, question: &str) -> Option<ClueId> {
        self.pending.remove(question).map(|p| p.clue_id)
    }

    /// Drop pending questions registered at least `max_age` ago.
    ///
    /// Returns how many were evicted.
    pub fn purge_stale(&mut self, max_age: Duration) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|_, pending| pending.registered_at.elapsed() < max_age);
        let evicted = before - self.pending.len();
        if evicted > 0 {
            info!("Evicted {} stale pending question(s)", evicted);
        }
        evicted
    }

    /// Clues that have a committed log.
    pub fn clue_ids(&self) -> impl Iterator<Item = &ClueId> {
        self.committed.keys()
    }

    /// Total number of committed records across all clues.
    pub fn record_count(&self) -> usize {
        self.committed.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_rules::Verdict;

    fn incorrect() -> EvaluationResult {
        EvaluationResult::new(Verdict::Incorrect, "The easel is unused.")
    }

    #[test]
    fn test_register_then_commit() {
        let mut history = HistoryCorrelator::new();
        let clue = ClueId::from("easel");

        assert!(history.register_pending(clue.clone(), "is the easel still in use?"));
        assert!(history.is_pending("is the easel still in use?"));

        let record = history
            .commit("is the easel still in use?", incorrect())
            .cloned()
            .unwrap();
        assert_eq!(record.clue_id, clue);
        assert_eq!(record.question, "is the easel still in use?");
        assert_eq!(record.result, incorrect());

        assert!(!history.is_pending("is the easel still in use?"));
        assert_eq!(history.records_for_clue(&clue), &[record]);
    }

    #[test]
    fn test_duplicate_pending_text_ignored() {
        let mut history = HistoryCorrelator::new();

        assert!(history.register_pending(ClueId::from("easel"), "who painted it?"));
        assert!(!history.register_pending(ClueId::from("canvas"), "who painted it?"));
        assert_eq!(history.pending_clue("who painted it?"), Some(&ClueId::from("easel")));

        history.commit("who painted it?", incorrect());
        assert_eq!(history.records_for_clue(&ClueId::from("easel")).len(), 1);
        assert!(history.records_for_clue(&ClueId::from("canvas")).is_empty());
    }

    #[test]
    fn test_orphan_commit_dropped() {
        let mut history = HistoryCorrelator::new();
        assert!(history.commit("never asked", incorrect()).is_none());
        assert_eq!(history.record_count(), 0);
    }

    #[test]
    fn test_failed_evaluation_still_commits() {
        let mut history = HistoryCorrelator::new();
        let clue = ClueId::from("ashes");
        history.register_pending(clue.clone(), "q");
        history.commit("q", EvaluationResult::unexpected("API Error: HTTP 500"));

        let records = history.records_for_clue(&clue);
        assert_eq!(records.len(), 1);
        assert!(records[0].result.is_unexpected());
    }

    #[test]
    fn test_records_keep_insertion_order() {
        let mut history = HistoryCorrelator::new();
        let clue = ClueId::from("easel");

        for q in ["first", "second", "third"] {
            history.register_pending(clue.clone(), q);
        }
        for q in ["second", "first", "third"] {
            history.commit(q, incorrect());
        }

        let questions: Vec<_> = history
            .records_for_clue(&clue)
            .iter()
            .map(|r| r.question.as_str())
            .collect();
        assert_eq!(questions, vec!["second", "first", "third"]);
    }

    #[test]
    fn test_delete_exact_record() {
        let mut history = HistoryCorrelator::new();
        let clue = ClueId::from("easel");

        history.register_pending(clue.clone(), "same text");
        let first = history.commit("same text", incorrect()).cloned().unwrap();
        history.register_pending(clue.clone(), "same text");
        let second = history.commit("same text", incorrect()).cloned().unwrap();

        assert!(history.delete_record(&first));
        assert_eq!(history.records_for_clue(&clue), &[second]);
        assert!(!history.delete_record(&first));
    }

    #[test]
    fn test_delete_clue_history() {
        let mut history = HistoryCorrelator::new();
        history.register_pending(ClueId::from("a"), "qa");
        history.register_pending(ClueId::from("b"), "qb");
        history.commit("qa", incorrect());
        history.commit("qb", incorrect());

        assert!(history.delete_clue_history(&ClueId::from("a")));
        assert!(!history.delete_clue_history(&ClueId::from("a")));
        assert!(history.records_for_clue(&ClueId::from("a")).is_empty());
        assert_eq!(history.records_for_clue(&ClueId::from("b")).len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut history = HistoryCorrelator::new();
        history.register_pending(ClueId::from("a"), "committed");
        history.commit("committed", incorrect());
        history.register_pending(ClueId::from("a"), "still pending");

        history.reset();

        assert_eq!(history.pending_count(), 0);
        assert_eq!(history.record_count(), 0);
        assert!(history.commit("still pending", incorrect()).is_none());
    }

    #[test]
    fn test_cancel_pending() {
        let mut history = HistoryCorrelator::new();
        history.register_pending(ClueId::from("a"), "q");

        assert_eq!(history.cancel_pending("q"), Some(ClueId::from("a")));
        assert!(history.commit("q", incorrect()).is_none());
    }

    #[test]
    fn test_purge_stale() {
        let mut history = HistoryCorrelator::new();
        history.register_pending(ClueId::from("a"), "q1");
        history.register_pending(ClueId::from("a"), "q2");

        assert_eq!(history.purge_stale(Duration::from_secs(3600)), 0);
        assert_eq!(history.pending_count(), 2);

        assert_eq!(history.purge_stale(Duration::ZERO), 2);
        assert_eq!(history.pending_count(), 0);
    }
}
