//! Shard id extraction and job assignment.
//!
//! Worker jobs name their output files `<anything>_<shard>.<ext>`.
//! A merge job owns every shard whose id is congruent to its
//! zero-based job index modulo the number of jobs.

use crate::utils::config::{SHARD_ID_DELIMITER, SHARD_ID_TERMINATOR};
use crate::utils::error::SelectError;
use std::num::IntErrorKind;

/// Which shards this merge invocation is responsible for
///
/// **Public** - constructed from CLI arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardAssignment {
    /// Zero-based job index
    job_index: u64,

    /// Total number of jobs (modulus)
    num_jobs: u64,
}

impl ShardAssignment {
    /// Build an assignment from a 1-based job id
    ///
    /// **Public** - job schedulers hand out 1-based ids
    ///
    /// # Errors
    /// * `SelectError::ZeroJobs` - `num_jobs` is zero
    /// * `SelectError::JobOutOfRange` - `job_id` is zero or above `num_jobs`
    pub fn from_one_based(job_id: u64, num_jobs: u64) -> Result<Self, SelectError> {
        if num_jobs == 0 {
            return Err(SelectError::ZeroJobs);
        }

        if job_id == 0 || job_id > num_jobs {
            return Err(SelectError::JobOutOfRange { job_id, num_jobs });
        }

        Ok(Self {
            job_index: job_id - 1,
            num_jobs,
        })
    }

    /// Assignment covering every shard
    pub fn single() -> Self {
        Self { job_index: 0, num_jobs: 1 }
    }

    pub fn job_index(&self) -> u64 {
        self.job_index
    }

    pub fn num_jobs(&self) -> u64 {
        self.num_jobs
    }

    /// Check whether a shard belongs to this job
    ///
    /// **Public** - negative ids wrap with floored modulo
    pub fn owns(&self, shard_id: i64) -> bool {
        let modulus = i128::from(self.num_jobs);
        i128::from(shard_id).rem_euclid(modulus) == i128::from(self.job_index)
    }
}

/// Extract the shard id from a file name
///
/// **Public** - used by the file selector
///
/// Takes the text after the last `_` (the whole name if there is none)
/// up to the first `.` and parses it as an integer.
///
/// # Errors
/// * `SelectError::MalformedFileName` - the extracted text is not an integer
/// * `SelectError::ShardIdOutOfRange` - the integer does not fit in an `i64`
///
/// # Example
/// ```ignore
/// assert_eq!(extract_shard_id("theo_residuals_12.out")?, 12);
/// ```
pub fn extract_shard_id(file_name: &str) -> Result<i64, SelectError> {
    let tail = file_name
        .rsplit(SHARD_ID_DELIMITER)
        .next()
        .unwrap_or(file_name);

    let shard_text = tail.split(SHARD_ID_TERMINATOR).next().unwrap_or(tail);

    shard_text.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => SelectError::ShardIdOutOfRange {
            file_name: file_name.to_string(),
            shard_text: shard_text.to_string(),
        },
        _ => SelectError::MalformedFileName {
            file_name: file_name.to_string(),
            shard_text: shard_text.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_shard_id() {
        assert_eq!(extract_shard_id("run_0.out").unwrap(), 0);
        assert_eq!(extract_shard_id("theo_res_ms2_42.out").unwrap(), 42);
        assert_eq!(extract_shard_id("run_7.out.gz").unwrap(), 7);
    }

    #[test]
    fn test_extract_shard_id_signed() {
        assert_eq!(extract_shard_id("run_-3.out").unwrap(), -3);
        assert_eq!(extract_shard_id("run_+5.out").unwrap(), 5);
    }

    #[test]
    fn test_extract_shard_id_no_underscore() {
        let err = extract_shard_id("run.out").unwrap_err();
        assert!(matches!(
            err,
            SelectError::MalformedFileName { ref shard_text, .. } if shard_text == "run"
        ));
    }

    #[test]
    fn test_extract_shard_id_overflow() {
        let err = extract_shard_id("run_99999999999999999999.out").unwrap_err();
        assert!(matches!(
            err,
            SelectError::ShardIdOutOfRange { ref shard_text, .. }
                if shard_text == "99999999999999999999"
        ));
        assert!(err.to_string().contains("out of range"));

        let err = extract_shard_id("run_-99999999999999999999.out").unwrap_err();
        assert!(matches!(err, SelectError::ShardIdOutOfRange { .. }));
    }

    #[test]
    fn test_extract_shard_id_not_numeric() {
        assert!(extract_shard_id("run_final.out").is_err());
        assert!(extract_shard_id("run_.out").is_err());
    }

    #[test]
    fn test_assignment_from_one_based() {
        let assignment = ShardAssignment::from_one_based(2, 3).unwrap();
        assert_eq!(assignment.job_index(), 1);
        assert_eq!(assignment.num_jobs(), 3);
    }

    #[test]
    fn test_assignment_rejects_bad_ids() {
        assert!(matches!(
            ShardAssignment::from_one_based(1, 0),
            Err(SelectError::ZeroJobs)
        ));
        assert!(matches!(
            ShardAssignment::from_one_based(0, 2),
            Err(SelectError::JobOutOfRange { .. })
        ));
        assert!(matches!(
            ShardAssignment::from_one_based(3, 2),
            Err(SelectError::JobOutOfRange { .. })
        ));
    }

    #[test]
    fn test_owns_partitions_shards() {
        let jobs: Vec<ShardAssignment> = (1..=3)
            .map(|id| ShardAssignment::from_one_based(id, 3).unwrap())
            .collect();

        for shard in -10..10 {
            let owners = jobs.iter().filter(|job| job.owns(shard)).count();
            assert_eq!(owners, 1, "shard {} must have exactly one owner", shard);
        }
    }

    #[test]
    fn test_owns_negative_shard() {
        // -1 mod 3 == 2 -> job id 3
        let job3 = ShardAssignment::from_one_based(3, 3).unwrap();
        assert!(job3.owns(-1));
    }

    #[test]
    fn test_single_owns_everything() {
        let single = ShardAssignment::single();
        assert!(single.owns(0));
        assert!(single.owns(123));
        assert!(single.owns(-9));
    }
}
