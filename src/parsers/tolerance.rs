use anyhow::{Result, bail};
use tracing::warn;

const MAX_CONSECUTIVE_ERRORS: usize = 100;
const MAX_FAILURE_RATE: f64 = 0.5;

/// Tracks per-record parse failures for one input file.
///
/// Individual bad records are skipped with a warning; the file is rejected once failures
/// look systematic (too many in a row, or more than half overall).
pub struct ErrorBudget<'a> {
    label: &'a str,
    total: usize,
    skipped: usize,
    consecutive: usize,
}

impl<'a> ErrorBudget<'a> {
    pub fn new(label: &'a str) -> Self {
        Self { label, total: 0, skipped: 0, consecutive: 0 }
    }

    pub fn record_ok(&mut self) {
        self.total += 1;
        self.consecutive = 0;
    }

    pub fn record_err(&mut self, record: usize, error: impl std::fmt::Display) -> Result<()> {
        self.total += 1;
        self.skipped += 1;
        self.consecutive += 1;
        warn!("Failed to parse record {} in {}: {}", record, self.label, error);

        if self.consecutive >= MAX_CONSECUTIVE_ERRORS {
            bail!(
                "Too many consecutive parse errors ({}) in {} - file may be corrupted",
                self.consecutive,
                self.label
            );
        }
        Ok(())
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Fails when more than half of all records were rejected
    pub fn finish(&self) -> Result<()> {
        if self.total > 0 {
            let failure_rate = self.skipped as f64 / self.total as f64;
            if failure_rate > MAX_FAILURE_RATE {
                bail!(
                    "Too many parse failures in {}: {} of {} records failed ({:.1}%)",
                    self.label,
                    self.skipped,
                    self.total,
                    failure_rate * 100.0
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_accepts_minor_corruption() {
        let mut budget = ErrorBudget::new("chat.jsonl");
        budget.record_ok();
        budget.record_ok();
        budget.record_err(3, "bad json").unwrap();
        assert_eq!(budget.skipped(), 1);
        assert!(budget.finish().is_ok());
    }

    #[test]
    fn test_budget_rejects_majority_failures() {
        let mut budget = ErrorBudget::new("chat.jsonl");
        budget.record_ok();
        budget.record_err(2, "bad").unwrap();
        budget.record_err(3, "bad").unwrap();
        let err = budget.finish().unwrap_err();
        assert!(err.to_string().contains("2 of 3 records failed"));
    }

    #[test]
    fn test_budget_bails_on_consecutive_errors() {
        let mut budget = ErrorBudget::new("chat.jsonl");
        for i in 0..MAX_CONSECUTIVE_ERRORS - 1 {
            budget.record_err(i, "bad").unwrap();
        }
        let err = budget.record_err(MAX_CONSECUTIVE_ERRORS, "bad").unwrap_err();
        assert!(err.to_string().contains("Too many consecutive parse errors"));
    }
}
