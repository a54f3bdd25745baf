use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::hardware::lock::OwnerId;

/// Recoverable outcomes of device operations.
///
/// Argument violations are not represented here, they abort the caller instead.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device is locked by someone else (or by the caller through another handle).
    #[error("device is already owned by {owner}")]
    OwnershipConflict { owner: OwnerId },
    /// The device is not accepting changes right now, retry later. Nothing was applied.
    #[error("device busy, retry after the next frame boundary")]
    Busy,
    /// The input register could not be read.
    #[error("controller input register unavailable")]
    InputUnavailable,
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read asset {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("expected {expected} {what}, found {found}")]
    Length {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

impl AssetError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        AssetError::Parse {
            line,
            reason: reason.into(),
        }
    }
}
