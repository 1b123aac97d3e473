//! Error types for the benchmark engine.
//!
//! Every variant here is fatal to the benchmark it occurs in. Affinity
//! failures and numeric drift between kernels are warnings and never
//! surface as a `BenchError`.

use thiserror::Error;

/// Fatal benchmark errors
#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid configuration detected before any timed invocation
    #[error("configuration error: {0}")]
    Config(String),

    /// Unrecognised kernel variant name
    #[error("unknown kernel variant '{0}' (expected naive, opt, vec or para)")]
    UnknownVariant(String),

    /// Operand shapes violate the kernel precondition
    #[error(
        "dimension mismatch: A is {a_rows}x{a_cols}, B is {b_rows}x{b_cols}, R is {r_rows}x{r_cols}"
    )]
    DimensionMismatch {
        /// Rows of A
        a_rows: usize,
        /// Columns of A
        a_cols: usize,
        /// Rows of B
        b_rows: usize,
        /// Columns of B
        b_cols: usize,
        /// Rows of the output
        r_rows: usize,
        /// Columns of the output
        r_cols: usize,
    },

    /// A matrix or sample buffer could not be allocated
    #[error("allocation of {elements} elements failed: {message}")]
    Allocation {
        /// Requested element count
        elements: usize,
        /// Allocator message
        message: String,
    },

    /// A kernel panicked during an invocation
    #[error("kernel '{kernel}' faulted during {phase} run {run}: {message}")]
    KernelFault {
        /// Kernel name
        kernel: String,
        /// "warmup" or "measurement"
        phase: &'static str,
        /// Zero-based run index within the phase
        run: usize,
        /// Panic payload
        message: String,
    },
}

impl BenchError {
    /// Whether this error was raised before any kernel invocation
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BenchError::Config(_)
                | BenchError::UnknownVariant(_)
                | BenchError::DimensionMismatch { .. }
        )
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, BenchError>;
