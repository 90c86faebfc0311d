//! Pipeline configuration

/// Default number of concurrent digest workers
pub const DEFAULT_WORKERS: usize = 5;

/// Default capacity of the path channel between source and workers
pub const DEFAULT_PATH_BUFFER: usize = 1;

/// Configuration for a fingerprinting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of concurrent workers
    pub workers: usize,
    /// Capacity of the bounded path channel
    pub path_buffer: usize,
}

impl PipelineConfig {
    /// Create a configuration with the default worker count and buffer
    #[must_use]
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            path_buffer: DEFAULT_PATH_BUFFER,
        }
    }

    /// Set the number of workers (at least 1)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the path channel capacity (at least 1)
    #[must_use]
    pub fn with_path_buffer(mut self, path_buffer: usize) -> Self {
        self.path_buffer = path_buffer.max(1);
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
