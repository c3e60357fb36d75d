use crate::processor::ProcessingResult;
use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::time::Duration;

/// Run-wide counters, folded from per-file results.
///
/// Every field combines by addition, so totals do not depend on the order in
/// which files were processed or on how partial tallies are grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub files_processed: usize,
    pub files_modified: usize,
    pub files_failed: usize,
    pub blocks_removed: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl AggregateStats {
    pub fn from_result(result: &ProcessingResult) -> Self {
        Self {
            files_processed: 1,
            files_modified: usize::from(result.modified),
            blocks_removed: result.blocks_removed,
            ..Default::default()
        }
    }

    pub fn failure() -> Self {
        Self {
            files_failed: 1,
            ..Default::default()
        }
    }

    pub fn record(&mut self, result: &ProcessingResult) {
        *self += Self::from_result(result);
    }

    pub fn record_failure(&mut self) {
        *self += Self::failure();
    }
}

impl Add for AggregateStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            files_processed: self.files_processed + other.files_processed,
            files_modified: self.files_modified + other.files_modified,
            files_failed: self.files_failed + other.files_failed,
            blocks_removed: self.blocks_removed + other.blocks_removed,
            elapsed: self.elapsed + other.elapsed,
        }
    }
}

impl AddAssign for AggregateStats {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for AggregateStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(modified: bool, blocks_removed: usize) -> ProcessingResult {
        ProcessingResult {
            modified,
            blocks_removed,
            output: None,
        }
    }

    #[test]
    fn test_record() {
        let mut stats = AggregateStats::default();
        stats.record(&result(true, 2));
        stats.record(&result(false, 0));
        stats.record(&result(true, 0));
        stats.record_failure();

        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.files_modified, 2);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.blocks_removed, 2);
    }

    #[test]
    fn test_order_independent() {
        let a = AggregateStats::from_result(&result(true, 3));
        let b = AggregateStats::from_result(&result(false, 0));
        let c = AggregateStats::failure();

        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
        assert_eq!([a, b, c].into_iter().sum::<AggregateStats>(), c + b + a);
    }

    #[test]
    fn test_serializes_elapsed_as_millis() {
        let stats = AggregateStats {
            elapsed: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["elapsed_ms"], 1500);
        assert_eq!(json["files_processed"], 0);
    }
}
