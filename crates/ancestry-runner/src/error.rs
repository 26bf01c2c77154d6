//! Error types for the runner binary.
//!
//! [`RunnerError`] is the top-level error type that wraps all failure
//! modes during startup and simulation execution, so `main` can propagate
//! everything with `?`.

/// Top-level error for the runner binary.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ancestry_sim::ConfigError,
    },

    /// The simulation itself failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: ancestry_sim::SimulationError,
    },

    /// The incremental and classic pipelines disagreed.
    #[error("pipeline verification failed: {message}")]
    Verification {
        /// Which tables diverged.
        message: String,
    },

    /// The summary line could not be serialized.
    #[error("summary serialization failed: {source}")]
    Summary {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
