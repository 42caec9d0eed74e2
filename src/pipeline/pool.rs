//! Generic bounded worker pool for one pipeline stage
//!
//! A [`StagePool`] owns exactly `n` tokio tasks bound to one input queue and
//! one output queue. Each worker pulls one item at a time, applies the stage
//! function, and pushes every output downstream, blocking when the output
//! queue is full — that blocking is the backpressure mechanism connecting
//! the tiers.
//!
//! Queue-closure rules:
//! - the pool never closes its input queue; that happens upstream when the
//!   last producer's `Sender` clone drops
//! - the pool closes its output queue implicitly: every worker owns one
//!   `Sender` clone and drops it on exit, so the downstream queue closes
//!   exactly when the whole producing tier has finished. Pools of several
//!   tiers feeding one queue compose for free, because each holds its own
//!   clones.
//!
//! A failure inside the stage function is contained at the worker: it is
//! logged, counted in the shared metrics, and treated as zero outputs for
//! that item. One bad URL can never stall or kill the pool.

use crate::pipeline::metrics::PipelineMetrics;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// A bounded pool of workers applying one stage function
pub struct StagePool {
    label: &'static str,
    workers: Vec<JoinHandle<()>>,
}

impl StagePool {
    /// Spawns `worker_count` workers draining `input` into `output`
    ///
    /// `stage_fn` may perform blocking I/O (fetch and extract) and may emit
    /// zero, one, or many outputs per input. An `Err` return is counted and
    /// logged, and the worker continues with the next item.
    pub fn spawn<I, O, E, F, Fut>(
        label: &'static str,
        worker_count: usize,
        input: mpsc::Receiver<I>,
        output: mpsc::Sender<O>,
        metrics: Arc<PipelineMetrics>,
        stage_fn: F,
    ) -> Self
    where
        I: Send + 'static,
        O: Send + 'static,
        E: Display + Send + 'static,
        F: Fn(I) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<O>, E>> + Send,
    {
        let input = Arc::new(Mutex::new(input));

        let workers = (0..worker_count)
            .map(|worker_id| {
                let input = Arc::clone(&input);
                let output = output.clone();
                let metrics = Arc::clone(&metrics);
                let stage_fn = stage_fn.clone();

                tokio::spawn(async move {
                    loop {
                        // Hold the receiver lock only while pulling one item.
                        // `None` means the queue is closed and fully drained.
                        let item = { input.lock().await.recv().await };
                        let Some(item) = item else {
                            break;
                        };

                        match stage_fn(item).await {
                            Ok(outputs) => {
                                for out in outputs {
                                    if output.send(out).await.is_err() {
                                        // Downstream receiver is gone; no
                                        // further work can be delivered.
                                        tracing::error!(
                                            "{} worker {}: output queue closed unexpectedly",
                                            label,
                                            worker_id
                                        );
                                        return;
                                    }
                                }
                            }
                            Err(error) => {
                                metrics.record_fetch_failure();
                                tracing::warn!("{} worker {}: {}", label, worker_id, error);
                            }
                        }
                    }

                    tracing::debug!("{} worker {} finished", label, worker_id);
                })
            })
            .collect();

        // `output` drops here; from now on only the workers hold senders.
        Self { label, workers }
    }

    /// Waits until every worker in the pool has returned
    ///
    /// After this resolves, all of the pool's output senders have been
    /// dropped, so the downstream queue is closed once every other
    /// producing pool has also been joined.
    pub async fn join(self) {
        for handle in self.workers {
            if let Err(error) = handle.await {
                // Stage functions contain their own failures, so this only
                // fires if a worker task itself panicked.
                tracing::error!("{} worker panicked: {}", self.label, error);
            }
        }
        tracing::debug!("{} pool complete", self.label);
    }
}
