//! Write-ahead log configuration.

/// Configuration for the segmented write-ahead log, matching the three
/// options a `TxnManager` exposes at construction.
#[derive(Debug, Clone)]
pub struct WalConfig {
    /// Segment rollover threshold in bytes (`logFileSize`).
    pub log_file_size: u64,
    /// In-memory write buffer size in bytes (`logBufferSize`).
    pub log_buffer_size: usize,
}

impl Default for WalConfig {
    fn default() -> Self {
        WalConfig {
            log_file_size: 8192,
            log_buffer_size: 4096,
        }
    }
}

impl WalConfig {
    /// Configuration with the defaults above.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segment rollover threshold (builder pattern).
    pub fn with_log_file_size(mut self, bytes: u64) -> Self {
        self.log_file_size = bytes;
        self
    }

    /// Set the in-memory buffer size (builder pattern).
    pub fn with_log_buffer_size(mut self, bytes: usize) -> Self {
        self.log_buffer_size = bytes;
        self
    }

    /// Reject nonsensical configurations.
    pub fn validate(&self) -> Result<(), WalConfigError> {
        if self.log_file_size < 64 {
            return Err(WalConfigError::LogFileSizeTooSmall);
        }
        if self.log_buffer_size as u64 > self.log_file_size {
            return Err(WalConfigError::BufferExceedsSegment);
        }
        Ok(())
    }

    /// A configuration with small segments, convenient for exercising
    /// rollover in tests without writing megabytes of data.
    pub fn for_testing() -> Self {
        WalConfig {
            log_file_size: 512,
            log_buffer_size: 128,
        }
    }
}

/// Invalid [`WalConfig`] combinations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalConfigError {
    /// `log_file_size` is too small to hold even a handful of records.
    #[error("log file size must be at least 64 bytes")]
    LogFileSizeTooSmall,
    /// `log_buffer_size` is larger than a single segment, which would make
    /// rollover-on-buffer-full impossible to honor.
    #[error("log buffer size cannot exceed log file size")]
    BufferExceedsSegment,
}
