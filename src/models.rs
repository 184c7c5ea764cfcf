//! Data models for the aggregation service.
//!
//! This module contains the job and result types passed between the HTTP
//! surface, the aggregator and the upstream fetcher.

use crate::config::LimitsConfig;
use crate::error::{AppError, FetchError};
use serde::Serialize;

/// Parameters of a single upstream fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// Index of the result slot this fetch fills.
    pub slot: usize,
    /// Number of integers to generate.
    pub length: usize,
}

impl FetchRequest {
    pub fn new(slot: usize, length: usize) -> Self {
        Self { slot, length }
    }
}

/// Outcome of a single upstream fetch.
pub type FetchResult = Result<Vec<i64>, FetchError>;

/// A validated aggregation job.
///
/// Only constructible through [`AggregationJob::new`], so holding one means both
/// parameters are inside the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationJob {
    requests: usize,
    length: usize,
}

impl AggregationJob {
    /// Validate `requests` and `length` against the configured limits.
    ///
    /// `requests` is checked first, so a job with both parameters out of range
    /// reports `requests`.
    pub fn new(requests: i64, length: i64, limits: &LimitsConfig) -> Result<Self, AppError> {
        let requests = validate_param("requests", requests, limits.max_requests)?;
        let length = validate_param("length", length, limits.max_length)?;
        Ok(Self { requests, length })
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The fetch that fills `slot`.
    pub fn fetch_request(&self, slot: usize) -> FetchRequest {
        FetchRequest::new(slot, self.length)
    }
}

/// Check that `value` lies in `1..=max`.
fn validate_param(name: &'static str, value: i64, max: usize) -> Result<usize, AppError> {
    if value <= 0 {
        return Err(AppError::too_small(name));
    }
    let max = i64::try_from(max).unwrap_or(i64::MAX);
    if value > max {
        return Err(AppError::too_large(name, max));
    }
    usize::try_from(value).map_err(|_| AppError::too_large(name, max))
}

/// A fetch that failed and was degraded to an empty slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFailure {
    /// Index of the slot in the job.
    pub index: usize,
    /// Why the fetch failed.
    pub error: FetchError,
}

/// The aggregated result of a job.
///
/// Serialized field names are kept for wire compatibility with existing clients:
/// `stddevofstddevs` holds the standard deviation of the sequence sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// One sequence per request, index-aligned with launch order.
    #[serde(rename = "numbers")]
    pub sequences: Vec<Vec<i64>>,

    /// Rounded standard deviation of each sequence.
    #[serde(rename = "stddevs")]
    pub std_devs: Vec<f64>,

    /// Rounded standard deviation of the per-sequence sums.
    #[serde(rename = "stddevofstddevs")]
    pub std_dev_of_sums: f64,

    /// Fetches that failed. Not part of the wire format.
    #[serde(skip)]
    pub failures: Vec<SlotFailure>,
}

impl AggregationResult {
    /// Returns true if every fetch of the job failed.
    pub fn is_fully_degraded(&self) -> bool {
        !self.sequences.is_empty() && self.failures.len() == self.sequences.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    #[test]
    fn test_job_accepts_bounds() {
        let job = AggregationJob::new(1, 1, &limits()).unwrap();
        assert_eq!(job.requests(), 1);
        assert_eq!(job.length(), 1);

        let job = AggregationJob::new(10, 1000, &limits()).unwrap();
        assert_eq!(job.requests(), 10);
        assert_eq!(job.fetch_request(9), FetchRequest::new(9, 1000));
    }

    #[test]
    fn test_job_rejects_out_of_range() {
        let cases = [
            (0, 1, "requests param has to be greater than 0"),
            (-3, 1, "requests param has to be greater than 0"),
            (11, 1, "requests param has to be smaller than or equal to 10"),
            (1, 0, "length param has to be greater than 0"),
            (1, 1001, "length param has to be smaller than or equal to 1000"),
        ];

        for (requests, length, message) in cases {
            let err = AggregationJob::new(requests, length, &limits()).unwrap_err();
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_job_reports_requests_first() {
        let err = AggregationJob::new(0, 0, &limits()).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidParameter {
                name: "requests",
                ..
            }
        ));
    }

    #[test]
    fn test_result_wire_format() {
        let result = AggregationResult {
            sequences: vec![vec![1, 2, 3], vec![]],
            std_devs: vec![0.816, 0.0],
            std_dev_of_sums: 3.0,
            failures: vec![SlotFailure {
                index: 1,
                error: FetchError::MissingResult,
            }],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "numbers": [[1, 2, 3], []],
                "stddevs": [0.816, 0.0],
                "stddevofstddevs": 3.0
            })
        );
    }

    #[test]
    fn test_fully_degraded() {
        let mut result = AggregationResult {
            sequences: vec![vec![], vec![]],
            std_devs: vec![0.0, 0.0],
            std_dev_of_sums: 0.0,
            failures: vec![],
        };
        assert!(!result.is_fully_degraded());

        result.failures = (0..2)
            .map(|index| SlotFailure {
                index,
                error: FetchError::Status(503),
            })
            .collect();
        assert!(result.is_fully_degraded());
    }
}
