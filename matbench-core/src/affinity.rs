//! CPU Affinity
//!
//! Pins the calling thread to one processor to keep the scheduler from
//! migrating it mid-measurement. Pinning is best effort: a failure is
//! reported as [`PinOutcome::Unpinned`] and the caller carries on with
//! default scheduling.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Result of a pinning attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOutcome {
    /// Thread is restricted to `cpu`
    Pinned {
        /// Target CPU
        cpu: usize,
    },
    /// Thread keeps its previous affinity
    Unpinned {
        /// Requested CPU
        cpu: usize,
        /// Why pinning failed
        reason: String,
    },
}

impl PinOutcome {
    /// Whether the pin took effect
    pub fn is_pinned(&self) -> bool {
        matches!(self, PinOutcome::Pinned { .. })
    }

    /// Human-readable warning for a failed pin
    pub fn warning(&self) -> Option<String> {
        match self {
            PinOutcome::Pinned { .. } => None,
            PinOutcome::Unpinned { cpu, reason } => Some(format!(
                "could not pin to CPU {cpu} ({reason}); measuring with default scheduling"
            )),
        }
    }
}

/// Number of online processors.
///
/// Unlike `std::thread::available_parallelism` this ignores the calling
/// thread's affinity mask, so it stays correct after the caller is pinned.
pub fn online_cpus() -> usize {
    #[cfg(target_os = "linux")]
    {
        // SAFETY: sysconf has no memory-safety preconditions.
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if n > 0 {
            return n as usize;
        }
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Set CPU affinity to pin the current thread to a specific core
#[cfg(target_os = "linux")]
pub fn pin_current_thread(cpu: usize) -> PinOutcome {
    let online = online_cpus();
    if cpu >= online || cpu >= libc::CPU_SETSIZE as usize {
        return PinOutcome::Unpinned {
            cpu,
            reason: format!("only {online} CPUs online"),
        };
    }

    // SAFETY: cpu_set_t is plain data; all-zero is the empty set and `cpu`
    // is below CPU_SETSIZE.
    let result = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };

    if result == 0 {
        PinOutcome::Pinned { cpu }
    } else {
        PinOutcome::Unpinned {
            cpu,
            reason: std::io::Error::last_os_error().to_string(),
        }
    }
}

/// Set CPU affinity to pin the current thread to a specific core
#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(cpu: usize) -> PinOutcome {
    PinOutcome::Unpinned {
        cpu,
        reason: "CPU pinning not supported on this platform".to_string(),
    }
}

#[cfg(target_os = "linux")]
type SavedMask = libc::cpu_set_t;

#[cfg(not(target_os = "linux"))]
type SavedMask = ();

#[cfg(target_os = "linux")]
fn current_mask() -> Option<SavedMask> {
    // SAFETY: the buffer is a properly sized, zeroed cpu_set_t.
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        let rc = libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set);
        (rc == 0).then_some(set)
    }
}

#[cfg(not(target_os = "linux"))]
fn current_mask() -> Option<SavedMask> {
    None
}

#[cfg(target_os = "linux")]
fn mask_cpus(set: &libc::cpu_set_t) -> Vec<usize> {
    // SAFETY: every index is below CPU_SETSIZE.
    (0..libc::CPU_SETSIZE as usize)
        .filter(|&cpu| unsafe { libc::CPU_ISSET(cpu, set) })
        .collect()
}

/// CPUs the calling thread may run on, ascending.
///
/// Reflects cpusets and earlier pinning, unlike [`online_cpus`]. Falls back
/// to every online CPU when the mask cannot be read.
pub fn allowed_cpus() -> Vec<usize> {
    #[cfg(target_os = "linux")]
    if let Some(set) = current_mask() {
        let cpus = mask_cpus(&set);
        if !cpus.is_empty() {
            return cpus;
        }
    }
    (0..online_cpus()).collect()
}

/// Pins the current thread and restores its previous mask on drop.
///
/// Keeps a benchmark embedded in a longer-lived process from leaving the
/// caller's thread pinned afterwards.
pub struct AffinityGuard {
    outcome: PinOutcome,
    previous: Option<SavedMask>,
}

impl AffinityGuard {
    /// Save the current mask, then pin to `cpu`
    pub fn pin(cpu: usize) -> Self {
        let previous = current_mask();
        let outcome = pin_current_thread(cpu);
        Self { outcome, previous }
    }

    /// Outcome of the pin attempt
    pub fn outcome(&self) -> &PinOutcome {
        &self.outcome
    }

    /// CPUs the thread was allowed to use before it was pinned
    pub fn allowed_cpus(&self) -> Vec<usize> {
        #[cfg(target_os = "linux")]
        if let Some(previous) = self.previous.as_ref() {
            let cpus = mask_cpus(previous);
            if !cpus.is_empty() {
                return cpus;
            }
        }
        (0..online_cpus()).collect()
    }
}

/// CPU assignment for parallel workers, shared by all workers of a benchmark.
///
/// Workers are placed round-robin over `cpus`, starting at the timing CPU.
/// Workers that fail to pin are counted so the runner can report them once.
#[derive(Debug)]
pub struct WorkerPlacement {
    cpus: Vec<usize>,
    unpinned: AtomicUsize,
    first_failure: OnceLock<String>,
}

impl WorkerPlacement {
    /// Place workers over `cpus` (every online CPU if empty)
    pub fn new(cpus: Vec<usize>) -> Self {
        let cpus = if cpus.is_empty() {
            (0..online_cpus()).collect()
        } else {
            cpus
        };
        Self {
            cpus,
            unpinned: AtomicUsize::new(0),
            first_failure: OnceLock::new(),
        }
    }

    /// Place workers over the calling thread's allowed CPUs
    pub fn detect() -> Self {
        Self::new(allowed_cpus())
    }

    /// CPUs workers rotate over
    pub fn cpus(&self) -> &[usize] {
        &self.cpus
    }

    /// CPU for `worker` when worker 0 belongs on `first_cpu`.
    ///
    /// A `first_cpu` outside the set starts the rotation at `first_cpu % len`.
    pub fn cpu_for(&self, first_cpu: usize, worker: usize) -> usize {
        let len = self.cpus.len().max(1);
        let start = self
            .cpus
            .iter()
            .position(|&cpu| cpu == first_cpu)
            .unwrap_or(first_cpu % len);
        self.cpus.get((start + worker % len) % len).copied().unwrap_or(0)
    }

    /// Pin the calling worker thread, recording a failure
    pub fn pin_worker(&self, first_cpu: usize, worker: usize) -> PinOutcome {
        let outcome = pin_current_thread(self.cpu_for(first_cpu, worker));
        if let PinOutcome::Unpinned { cpu, reason } = &outcome {
            self.record_failure(*cpu, reason);
        }
        outcome
    }

    /// Count a worker that could not be pinned
    pub fn record_failure(&self, cpu: usize, reason: &str) {
        self.unpinned.fetch_add(1, Ordering::Relaxed);
        let _ = self.first_failure.set(format!("CPU {cpu}: {reason}"));
    }

    /// Worker pin failures so far
    pub fn unpinned_workers(&self) -> usize {
        self.unpinned.load(Ordering::Relaxed)
    }

    /// Summary warning, if any worker failed to pin
    pub fn warning(&self) -> Option<String> {
        let failures = self.unpinned_workers();
        if failures == 0 {
            return None;
        }
        let first = self.first_failure.get().map(String::as_str).unwrap_or("unknown");
        Some(format!(
            "{failures} parallel worker pin attempt(s) failed (first on {first}); \
             workers may share CPUs"
        ))
    }
}

impl Drop for AffinityGuard {
    fn drop(&mut self) {
        if !self.outcome.is_pinned() {
            return;
        }
        #[cfg(target_os = "linux")]
        if let Some(previous) = self.previous.as_ref() {
            // SAFETY: `previous` was filled in by sched_getaffinity.
            let rc = unsafe {
                libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), previous)
            };
            if rc != 0 {
                tracing::warn!(
                    error = %std::io::Error::last_os_error(),
                    "failed to restore CPU affinity"
                );
            }
        }
        #[cfg(not(target_os = "linux"))]
        let _ = self.previous.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_cpus_positive() {
        assert!(online_cpus() >= 1);
    }

    #[test]
    fn test_out_of_range_cpu_is_non_fatal() {
        let outcome = pin_current_thread(usize::MAX / 2);
        assert!(!outcome.is_pinned());
        assert!(outcome.warning().unwrap().contains("could not pin"));
    }

    #[test]
    fn test_allowed_cpus_nonempty_and_online() {
        let cpus = allowed_cpus();
        assert!(!cpus.is_empty());
        assert!(cpus.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_placement_round_robin_from_first_cpu() {
        let placement = WorkerPlacement::new(vec![2, 5, 7]);
        assert_eq!(placement.cpu_for(5, 0), 5);
        assert_eq!(placement.cpu_for(5, 1), 7);
        assert_eq!(placement.cpu_for(5, 2), 2);
        assert_eq!(placement.cpu_for(5, 4), 7);
    }

    #[test]
    fn test_placement_huge_first_cpu_does_not_overflow() {
        let placement = WorkerPlacement::new(vec![0, 1, 2, 3]);
        for worker in [0, 1, 2, usize::MAX] {
            let cpu = placement.cpu_for(usize::MAX, worker);
            assert!(placement.cpus().contains(&cpu));
        }
    }

    #[test]
    fn test_placement_reports_failed_workers() {
        let placement = WorkerPlacement::new(vec![1 << 20]);
        assert_eq!(placement.warning(), None);

        assert!(!placement.pin_worker(0, 0).is_pinned());
        assert!(!placement.pin_worker(0, 1).is_pinned());

        assert_eq!(placement.unpinned_workers(), 2);
        let warning = placement.warning().unwrap();
        assert!(warning.starts_with("2 parallel worker"));
        assert!(warning.contains("CPU 1048576"));
    }

    #[test]
    fn test_pinned_has_no_warning() {
        assert_eq!(PinOutcome::Pinned { cpu: 0 }.warning(), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_guard_restores_previous_mask() {
        fn mask_count() -> usize {
            let set = current_mask().unwrap();
            unsafe { libc::CPU_COUNT(&set) as usize }
        }

        let before = mask_count();
        {
            let guard = AffinityGuard::pin(0);
            if guard.outcome().is_pinned() {
                assert_eq!(mask_count(), 1);
            }
        }
        assert_eq!(mask_count(), before);
    }
}
