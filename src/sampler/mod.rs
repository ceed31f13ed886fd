//! Async facade over the elevation pool.
//!
//! Pairs one [`ElevationPool`] with a bounded set of worker tasks so
//! callers can issue `get_sample` out of band and await the result. The
//! sampler keeps its own private working set rather than sharing one with
//! callers: working sets are single-owner structures, so the facade guards
//! its copy with a lock that worker tasks take one at a time.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::{oneshot, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::WorkingSet;
use crate::geo::GeoPoint;
use crate::map::Map;
use crate::pool::{ElevationPool, PoolError};
use crate::sample::Sample;

/// Asynchronous elevation sampler.
///
/// `get_sample` schedules the blocking pool query on the tokio blocking
/// pool, bounded by the configured concurrency, and returns a
/// [`SampleFuture`]. Must be used inside a tokio runtime.
pub struct AsyncElevationSampler {
    pool: Arc<ElevationPool>,
    working_set: Arc<Mutex<WorkingSet>>,
    permits: Arc<Semaphore>,
}

impl AsyncElevationSampler {
    /// Create a sampler bound to a map, with its own pool and at most
    /// `concurrency` samples in flight.
    pub fn new(map: &Arc<Map>, concurrency: usize) -> Self {
        let pool = Arc::new(ElevationPool::new());
        pool.set_map(map);
        Self::with_pool(pool, concurrency)
    }

    /// Create a sampler sharing an existing pool.
    pub fn with_pool(pool: Arc<ElevationPool>, concurrency: usize) -> Self {
        Self {
            pool,
            working_set: Arc::new(Mutex::new(WorkingSet::new())),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// The pool this sampler queries.
    pub fn pool(&self) -> &Arc<ElevationPool> {
        &self.pool
    }

    /// Schedule an elevation sample and return a future-valued handle.
    ///
    /// Cancelling the returned future prevents its result from being
    /// observed but does not abort layer I/O already in flight.
    pub fn get_sample(&self, point: GeoPoint, resolution_m: Option<f64>) -> SampleFuture {
        let (tx, rx) = oneshot::channel();
        let token = CancellationToken::new();

        let pool = Arc::clone(&self.pool);
        let working_set = Arc::clone(&self.working_set);
        let permits = Arc::clone(&self.permits);
        let task_token = token.clone();

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            if task_token.is_cancelled() {
                debug!("sample cancelled before execution");
                return;
            }

            let result = tokio::task::spawn_blocking(move || {
                let mut ws = working_set.lock();
                pool.get_sample(&point, resolution_m, Some(&mut *ws))
            })
            .await
            .unwrap_or(Err(PoolError::Cancelled));

            if !task_token.is_cancelled() {
                let _ = tx.send(result);
            }
        });

        SampleFuture { rx, token }
    }
}

/// Future-valued handle for a scheduled sample.
///
/// Resolves to the sample once the worker completes, or to
/// [`PoolError::Cancelled`] after [`SampleFuture::cancel`].
pub struct SampleFuture {
    rx: oneshot::Receiver<Result<Sample, PoolError>>,
    token: CancellationToken,
}

impl SampleFuture {
    /// Best-effort cancellation: the result will never be observed, but
    /// in-flight layer I/O is not aborted.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether this future has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Future for SampleFuture {
    type Output = Result<Sample, PoolError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.token.is_cancelled() {
            return Poll::Ready(Err(PoolError::Cancelled));
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(PoolError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}
