use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, mpsc};

use log::{debug, info};

use crate::model::results::{BatchResults, RunFailure, RunResult};

use super::config::ExtractionOptions;
use super::error::Error;
use super::{PackingSimulation, panic_message};

impl PackingSimulation {
    /// Runs `n` independent simulations (indices `0..n`) on a worker pool.
    ///
    /// Blocks until every run has reported. Successful results come back
    /// sorted by run index; failures are in completion order.
    pub fn run_parallel(&self, options: &ExtractionOptions, n: usize) -> BatchResults {
        self.run_parallel_with(options, n, |_| {})
    }

    /// Like [`run_parallel`](Self::run_parallel), calling `observer` on the
    /// calling thread as each outcome arrives.
    pub fn run_parallel_with<F>(
        &self,
        options: &ExtractionOptions,
        n: usize,
        mut observer: F,
    ) -> BatchResults
    where
        F: FnMut(&Result<RunResult, RunFailure>),
    {
        let mut batch = BatchResults::new(n);
        if n == 0 {
            return batch;
        }

        let threads = self.pool_size(n);
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("packsim-run-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                let message = Error::ThreadPool(e.to_string()).to_string();
                for _ in 0..n {
                    let outcome = Err(RunFailure::pool(message.clone()));
                    observer(&outcome);
                    batch.record(outcome);
                }
                return batch;
            }
        };

        info!("running {n} simulations on {threads} worker threads");

        let (tx, rx) = mpsc::sync_channel(n);
        let shared = Arc::new(self.clone());
        let options = *options;

        for index in 0..n {
            let tx = tx.clone();
            let sim = Arc::clone(&shared);
            pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| sim.run(&options, index)))
                    .unwrap_or_else(|payload| {
                        Err(RunFailure::pool(format!(
                            "worker panicked: {}",
                            panic_message(payload.as_ref())
                        )))
                    });
                // rx is drained until every sender is gone, so this cannot fail.
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        for outcome in rx {
            observer(&outcome);
            batch.record(outcome);
        }

        while batch.collected() < n {
            let outcome = Err(RunFailure::pool(
                "worker exited without reporting an outcome",
            ));
            observer(&outcome);
            batch.record(outcome);
        }

        batch.sort_successful();
        debug!(
            "batch finished: {} succeeded, {} failed",
            batch.successful_count(),
            batch.failed_count()
        );
        batch
    }

    /// Runs `n` simulations: synchronously on the calling thread for
    /// `n == 1`, on the worker pool otherwise.
    pub fn run_batch(&self, options: &ExtractionOptions, n: usize) -> BatchResults {
        if n == 1 {
            let mut batch = BatchResults::new(1);
            batch.record(self.run(options, 0));
            return batch;
        }
        self.run_parallel(options, n)
    }

    fn pool_size(&self, n: usize) -> usize {
        self.threads
            .unwrap_or_else(|| n.min(num_cpus::get()))
            .max(1)
    }
}
