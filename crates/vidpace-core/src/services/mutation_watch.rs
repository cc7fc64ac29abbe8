//! Debounced rescan trigger driven by document mutations.
//!
//! Only child-list batches that insert nodes count. The first such batch
//! arms a timer; every batch arriving before it fires is absorbed, so a
//! burst of DOM churn costs a single rescan.

use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ports::MutationBatch;

/// Collapses mutation batches into delayed rescans.
#[derive(Debug, Clone, Copy)]
pub struct MutationWatch {
    delay: Duration,
}

impl MutationWatch {
    /// Create a watch that rescans `delay` after the first insertion.
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Consume `mutations` until cancelled or the feed closes, calling
    /// `on_change` once per collapsed burst.
    ///
    /// Returns the number of rescans triggered.
    pub async fn run<F>(
        self,
        mut mutations: broadcast::Receiver<MutationBatch>,
        cancel: CancellationToken,
        on_change: F,
    ) -> usize
    where
        F: Fn() + Send + Sync,
    {
        let mut deadline: Option<Instant> = None;
        let mut rescans = 0;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(rescans, "Mutation watch cancelled");
                    break;
                }
                () = wait_for(deadline) => {
                    deadline = None;
                    rescans += 1;
                    on_change();
                }
                received = mutations.recv() => match received {
                    Ok(batch) if batch.has_insertions() => {
                        deadline.get_or_insert_with(|| Instant::now() + self.delay);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Mutation feed lagged, scheduling rescan");
                        deadline.get_or_insert_with(|| Instant::now() + self.delay);
                    }
                    Err(RecvError::Closed) => {
                        if let Some(pending) = deadline.take() {
                            tokio::select! {
                                () = cancel.cancelled() => {}
                                () = sleep_until(pending) => {
                                    rescans += 1;
                                    on_change();
                                }
                            }
                        }
                        break;
                    }
                },
            }
        }

        rescans
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
