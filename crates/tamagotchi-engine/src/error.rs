//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure that can abort startup or the
//! session run, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tamagotchi_core::config::ConfigError,
    },

    /// Session clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: tamagotchi_core::clock::ClockError,
    },

    /// The session loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: tamagotchi_core::runner::RunnerError,
    },

    /// A remote client could not be built.
    #[error("remote error: {source}")]
    Remote {
        /// The underlying remote error.
        #[from]
        source: tamagotchi_remote::error::RemoteError,
    },
}
