//! Worker pool seam (§4.10). A production thread/process pool for CPU-bound work dispatched from
//! an actor's `receive` is explicitly out of scope (Non-goals): this module only fixes the trait
//! boundary a hosting program would plug one into, plus a trivial inline executor that runs the
//! job on the calling task — correct for tests and for actors whose handlers are themselves
//! already cheap.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
// (none)

/// A pool capable of running boxed, type-erased units of work. A real implementation would hand
/// `job` to a bounded set of OS threads or a `tokio` blocking pool; see [`InlineWorkerPool`] for
/// the placeholder this crate ships.
#[async_trait]
pub trait WorkerPool: Send + Sync + 'static {
    async fn run(&self, job: Box<dyn FnOnce() + Send>);
}

/// Runs every job on the caller's own task, synchronously. Sufficient until a hosting program
/// has a CPU-bound workload that actually needs offloading.
pub struct InlineWorkerPool;

#[async_trait]
impl WorkerPool for InlineWorkerPool {
    async fn run(&self, job: Box<dyn FnOnce() + Send>) {
        job();
    }
}
