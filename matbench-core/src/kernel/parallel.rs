//! Multi-threaded matrix multiplication.
//!
//! Splits the rows of C into contiguous bands, one per worker, and runs the
//! i-k-j kernel on each band inside a `std::thread::scope`. Workers are
//! spawned and joined within a single call, so no thread outlives the
//! invocation that created it. Bands never overlap, so C needs no locking;
//! A and B are shared read-only.

use super::scalar_opt::matmul_rows_ikj;
use crate::affinity::{PinOutcome, WorkerPlacement};
use std::ops::Range;

/// Split `rows` into `workers` contiguous bands.
///
/// Bands differ in size by at most one row, larger bands first. When there
/// are fewer rows than workers the surplus workers receive empty bands.
pub fn partition_rows(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = rows / workers;
    let extra = rows % workers;

    let mut start = 0;
    (0..workers)
        .map(|w| {
            let len = base + usize::from(w < extra);
            let band = start..start + len;
            start += len;
            band
        })
        .collect()
}

/// Parallel matrix multiply, overwriting C with A * B.
///
/// Worker `w` pins itself to the `w`-th CPU of `placement` counting
/// round-robin from `cpu_id`. A worker that cannot be pinned still runs and
/// the failure is recorded in `placement`. Workers with an empty band are not
/// spawned.
///
/// # Arguments
///
/// * `num_threads` - Worker count (values below 1 are treated as 1)
/// * `cpu_id` - CPU for worker 0
/// * `placement` - CPUs the workers may use
#[allow(clippy::too_many_arguments)]
pub fn matmul_parallel(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    n: usize,
    k: usize,
    num_threads: usize,
    cpu_id: usize,
    placement: &WorkerPlacement,
) {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    let bands = partition_rows(m, num_threads);

    std::thread::scope(|s| {
        let mut rest: &mut [f32] = c;
        for (worker, band) in bands.into_iter().enumerate() {
            if band.is_empty() {
                continue;
            }
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(band.len() * n);
            rest = tail;

            s.spawn(move || {
                if let PinOutcome::Unpinned { cpu, reason } = placement.pin_worker(cpu_id, worker) {
                    tracing::debug!(worker, cpu, %reason, "worker running unpinned");
                }
                matmul_rows_ikj(a, b, chunk, band.start, n, k);
            });
        }
    });
}
