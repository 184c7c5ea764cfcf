//! Fan-out aggregation of upstream sequences.
//!
//! A job of `N` requests spawns `N` tasks, one per result slot. Every task owns
//! exactly one index and reports its outcome tagged with that index; the
//! orchestrator joins all of them before writing the slots and computing the
//! statistics. Upstream calls go through a process-wide semaphore whose size is
//! `upstream.max_in_flight`, so the number of simultaneous calls to random.org is
//! bounded no matter how many jobs are running.

use crate::analysis::stats::{rounded_std_dev, rounded_std_dev_of_sums, sequence_sums};
use crate::config::LimitsConfig;
use crate::error::{AppError, FetchError};
use crate::models::{AggregationJob, AggregationResult, FetchRequest, SlotFailure};
use crate::upstream::Fetcher;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// A filled result slot.
#[derive(Debug, Clone, PartialEq)]
struct Slot {
    sequence: Vec<i64>,
    std_dev: f64,
}

/// What a fetch task hands back to the orchestrator.
#[derive(Debug)]
struct SlotOutcome {
    index: usize,
    result: Result<Slot, FetchError>,
}

/// Runs aggregation jobs against a [`Fetcher`].
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<dyn Fetcher>,
    limiter: Arc<Semaphore>,
    limits: LimitsConfig,
}

impl Aggregator {
    /// Create an aggregator allowing at most `max_in_flight` concurrent upstream calls.
    pub fn new(fetcher: Arc<dyn Fetcher>, max_in_flight: usize, limits: LimitsConfig) -> Self {
        Self {
            fetcher,
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
            limits,
        }
    }

    /// Validate the parameters, then run the job.
    ///
    /// Validation errors are returned before any fetch is started. Once the job
    /// runs, upstream failures only degrade individual slots.
    pub async fn aggregate(
        &self,
        requests: i64,
        length: i64,
    ) -> Result<AggregationResult, AppError> {
        let job = AggregationJob::new(requests, length, &self.limits)?;
        Ok(self.run(job).await)
    }

    /// Run a validated job.
    pub async fn run(&self, job: AggregationJob) -> AggregationResult {
        let count = job.requests();
        info!(requests = count, length = job.length(), "aggregation job started");

        let mut sequences: Vec<Vec<i64>> = vec![Vec::new(); count];
        let mut std_devs: Vec<f64> = vec![0.0; count];
        let mut failures = Vec::new();

        // Tasks are detached from this future: if the caller goes away they still
        // run to completion or timeout.
        let handles: Vec<_> = (0..count)
            .map(|index| {
                let fetcher = Arc::clone(&self.fetcher);
                let limiter = Arc::clone(&self.limiter);
                tokio::spawn(fetch_slot(fetcher, limiter, job.fetch_request(index)))
            })
            .collect();

        for (index, joined) in join_all(handles).await.into_iter().enumerate() {
            let outcome = joined.unwrap_or_else(|e| SlotOutcome {
                index,
                result: Err(FetchError::Aborted(e.to_string())),
            });
            debug_assert_eq!(outcome.index, index);

            match outcome.result {
                Ok(slot) => {
                    sequences[outcome.index] = slot.sequence;
                    std_devs[outcome.index] = slot.std_dev;
                }
                Err(error) => {
                    warn!(index = outcome.index, error = %error, "fetch failed, slot left empty");
                    failures.push(SlotFailure {
                        index: outcome.index,
                        error,
                    });
                }
            }
        }

        let sums = sequence_sums(&sequences);
        let std_dev_of_sums = rounded_std_dev_of_sums(&sums);

        info!(
            requests = count,
            failed = failures.len(),
            std_dev_of_sums,
            "aggregation job finished"
        );

        AggregationResult {
            sequences,
            std_devs,
            std_dev_of_sums,
            failures,
        }
    }
}

/// Fetch one slot while holding an upstream permit.
async fn fetch_slot(
    fetcher: Arc<dyn Fetcher>,
    limiter: Arc<Semaphore>,
    request: FetchRequest,
) -> SlotOutcome {
    let index = request.slot;

    let _permit = match limiter.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            return SlotOutcome {
                index,
                result: Err(FetchError::Aborted("upstream limiter closed".to_string())),
            }
        }
    };

    debug!(index, "fetching slot");
    let result = fetcher.fetch(request).await.map(|sequence| {
        let std_dev = rounded_std_dev(&sequence);
        Slot { sequence, std_dev }
    });

    SlotOutcome { index, result }
}
