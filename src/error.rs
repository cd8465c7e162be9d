//! Error types for IBT decoding and tick processing.
//!
//! All errors implement `std::error::Error` and carry enough structured context to tell
//! which part of the file or pipeline failed.
//!
//! ## Error Categories
//!
//! - **Structural decode errors**: a sub-header failed validation or could not be read
//!   ([`TelemetryError::Parse`], [`TelemetryError::Source`], wrapped by
//!   [`TelemetryError::Header`] during composite decoding)
//! - **Typed access errors**: a tick key is missing or holds another type
//! - **Consumer errors**: a [`Processor`](crate::Processor) failed, surfaced verbatim
//! - **Cancellation**: the pipeline observed its cancellation token
//!
//! Failures tied to one recording are wrapped in [`TelemetryError::InFile`].
//!
//! Stream exhaustion is never an error; it is reported through the parser's
//! continuation flag.
//!
//! ```rust
//! use ibtstream::{HeaderStage, TelemetryError};
//!
//! let cause = TelemetryError::parse("telemetry header", "version 3");
//! let error = TelemetryError::header(HeaderStage::Telemetry, cause);
//! assert!(error.to_string().starts_with("failed to parse telemetry header: "));
//! assert!(!error.is_retryable());
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for decoding and processing.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("IBT file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {context}: {source}")]
    Source {
        context: String,
        #[source]
        source: SourceError,
    },

    #[error("invalid {context} detected: {details}")]
    Parse { context: String, details: String },

    #[error("failed to parse {stage}: {source}")]
    Header {
        stage: HeaderStage,
        #[source]
        source: Box<TelemetryError>,
    },

    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<TelemetryError>,
    },

    #[error("key {field} not found in telemetry variables")]
    FieldNotFound { field: String },

    #[error("value of {field} was {actual} not {expected}")]
    TypeConversion { field: String, expected: &'static str, actual: &'static str },

    #[error(transparent)]
    Processor(anyhow::Error),

    #[error("processing cancelled")]
    Cancelled,
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::File { .. } => false,
            TelemetryError::Source { source, .. } => source.is_exhausted(),
            TelemetryError::Parse { .. } => false,
            TelemetryError::Header { source, .. } => source.is_retryable(),
            TelemetryError::InFile { source, .. } => source.is_retryable(),
            TelemetryError::FieldNotFound { .. } => false,
            TelemetryError::TypeConversion { .. } => false,
            TelemetryError::Processor(_) => false,
            TelemetryError::Cancelled => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Verify the path points at an .ibt recording",
            ],
            TelemetryError::Source { .. } => vec![
                "Check the file is not truncated",
                "For live recordings, wait for the simulator to flush more data",
            ],
            TelemetryError::Parse { .. } => vec![
                "Verify the file is an IBT recording (header version 2)",
                "Check the file was not corrupted during copy",
            ],
            TelemetryError::Header { source, .. } => source.recovery_suggestions(),
            TelemetryError::InFile { source, .. } => source.recovery_suggestions(),
            TelemetryError::FieldNotFound { .. } => vec![
                "Check field name spelling",
                "Add the field to the processor whitelist",
                "Verify the field exists for this car",
            ],
            TelemetryError::TypeConversion { .. } => vec![
                "Check the variable type in the file's variable headers",
                "Request the array type for variables with count > 1",
            ],
            TelemetryError::Processor(_) => vec!["Inspect the processor error for details"],
            TelemetryError::Cancelled => vec!["Restart processing with a fresh cancellation token"],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for structural validation errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for failed bounded reads.
    pub fn read_failed(context: impl Into<String>, source: SourceError) -> Self {
        TelemetryError::Source { context: context.into(), source }
    }

    /// Wraps a sub-header failure with the composite decode stage that produced it.
    pub fn header(stage: HeaderStage, source: TelemetryError) -> Self {
        TelemetryError::Header { stage, source: Box::new(source) }
    }

    /// Attaches the file a failure belongs to.
    pub fn in_file(path: impl Into<PathBuf>, source: TelemetryError) -> Self {
        TelemetryError::InFile { path: path.into(), source: Box::new(source) }
    }

    /// Returns the composite decode stage, if this error came from header decoding.
    pub fn stage(&self) -> Option<HeaderStage> {
        match self {
            TelemetryError::Header { stage, .. } => Some(*stage),
            TelemetryError::InFile { source, .. } => source.stage(),
            _ => None,
        }
    }

    /// Returns true for the cooperative cancellation error.
    pub fn is_cancelled(&self) -> bool {
        match self {
            TelemetryError::Cancelled => true,
            TelemetryError::InFile { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

/// Failure of a bounded read against a [`ByteSource`](crate::ByteSource).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SourceError {
    /// Fewer bytes are available than requested. This is the end-of-stream condition.
    #[error("insufficient bytes at offset {offset}: requested {requested}, available {available}")]
    Exhausted { offset: u64, requested: usize, available: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source is closed")]
    Closed,
}

impl SourceError {
    /// Returns true when the read failed only because the source ended.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, SourceError::Exhausted { .. })
    }
}

/// Stages of composite header decoding, in decode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderStage {
    Telemetry,
    Disk,
    SessionInfo,
    VarHeader,
    VarBuffer,
}

impl fmt::Display for HeaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderStage::Telemetry => "telemetry header",
            HeaderStage::Disk => "disk header",
            HeaderStage::SessionInfo => "session info",
            HeaderStage::VarHeader => "variable header",
            HeaderStage::VarBuffer => "var buffer header",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_format_correctly_with_arbitrary_context(
                context in ".*",
                details in ".*",
                field in "\\w+",
                offset in any::<u64>(),
                requested in 0usize..1_000_000usize,
            ) {
                let parse = TelemetryError::parse(context.clone(), details.clone());
                let message = parse.to_string();
                prop_assert!(message.contains(&context));
                prop_assert!(message.contains(&details));

                let missing = TelemetryError::FieldNotFound { field: field.clone() };
                prop_assert!(missing.to_string().contains(&field));

                let exhausted = SourceError::Exhausted { offset, requested, available: 0 };
                let message = exhausted.to_string();
                prop_assert!(message.contains(&offset.to_string()));
                prop_assert!(message.contains(&requested.to_string()));
            }

            #[test]
            fn header_wrapper_keeps_stage_prefix(details in ".*") {
                for stage in [
                    HeaderStage::Telemetry,
                    HeaderStage::Disk,
                    HeaderStage::SessionInfo,
                    HeaderStage::VarHeader,
                    HeaderStage::VarBuffer,
                ] {
                    let wrapped = TelemetryError::header(stage, TelemetryError::parse("x", details.clone()));
                    let prefix = format!("failed to parse {}: ", stage);
                    prop_assert!(wrapped.to_string().starts_with(&prefix));
                    prop_assert_eq!(wrapped.stage(), Some(stage));
                }
            }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TelemetryError>();
        assert_send_sync_static::<SourceError>();

        let error = TelemetryError::Cancelled;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn processor_errors_display_verbatim() {
        let error = TelemetryError::Processor(anyhow::anyhow!("unit test error"));
        assert_eq!(error.to_string(), "unit test error");
        assert!(!error.is_cancelled());
        assert!(TelemetryError::Cancelled.is_cancelled());
    }

    #[test]
    fn type_conversion_names_both_types() {
        let error = TelemetryError::TypeConversion {
            field: "Speed".to_string(),
            expected: "i32",
            actual: "f32",
        };
        assert_eq!(error.to_string(), "value of Speed was f32 not i32");
    }

    #[test]
    fn in_file_prefixes_path_and_keeps_stage() {
        let cause = TelemetryError::header(
            HeaderStage::Telemetry,
            TelemetryError::parse("telemetry header", "version 3"),
        );
        let error = TelemetryError::in_file("race.ibt", cause);
        assert!(error.to_string().starts_with("race.ibt: failed to parse telemetry header: "));
        assert_eq!(error.stage(), Some(HeaderStage::Telemetry));
        assert!(TelemetryError::in_file("a.ibt", TelemetryError::Cancelled).is_cancelled());
    }

    #[test]
    fn recovery_methods_work() {
        let exhausted = TelemetryError::read_failed(
            "disk header",
            SourceError::Exhausted { offset: 112, requested: 32, available: 10 },
        );
        let wrapped = TelemetryError::header(HeaderStage::Disk, exhausted);
        assert!(wrapped.is_retryable());
        assert!(!wrapped.recovery_suggestions().is_empty());

        let parse = TelemetryError::parse("telemetry header", "bad version");
        assert!(!parse.is_retryable());
        for suggestion in parse.recovery_suggestions() {
            assert!(suggestion.len() > 5);
        }
    }

    #[test]
    fn from_conversions_work() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test file");
        let telemetry_err: TelemetryError = io_err.into();

        match telemetry_err {
            TelemetryError::File { source, .. } => {
                assert_eq!(source.to_string(), "test file");
            }
            _ => panic!("Expected File error variant"),
        }

        let source_err: SourceError = std::io::Error::other("boom").into();
        assert!(!source_err.is_exhausted());
    }
}
