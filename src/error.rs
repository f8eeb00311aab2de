use thiserror::Error;

/// Errors raised while talking to the GPU management interface.
///
/// Any of these ends the run; no partial report is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Failed to initialize NVML: {cause}")]
    Init { cause: String },

    #[error("Failed to {operation}: {cause}")]
    Query { operation: String, cause: String },

    #[error("Failed to shutdown NVML: {cause}")]
    Shutdown { cause: String },
}

impl DriverError {
    pub fn init(cause: impl ToString) -> Self {
        DriverError::Init {
            cause: cause.to_string(),
        }
    }

    pub fn query(operation: impl Into<String>, cause: impl ToString) -> Self {
        DriverError::Query {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    pub fn shutdown(cause: impl ToString) -> Self {
        DriverError::Shutdown {
            cause: cause.to_string(),
        }
    }
}

/// Why the owner of a GPU process could not be determined.
///
/// Only ever affects a single process row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("pid {pid} is out of range for this system")]
    InvalidPid { pid: u32 },

    #[error("cannot read process metadata for pid {pid}: {cause}")]
    ProcessUnavailable { pid: u32, cause: String },

    #[error("user database lookup for uid {uid} failed: {cause}")]
    UserLookup { uid: u32, cause: String },

    #[error("no user database entry for uid {uid}")]
    UnknownUser { uid: u32 },
}

impl OwnershipError {
    /// The uid, if resolution got far enough to learn it.
    pub fn uid(&self) -> Option<u32> {
        match self {
            OwnershipError::UserLookup { uid, .. } | OwnershipError::UnknownUser { uid } => {
                Some(*uid)
            }
            OwnershipError::InvalidPid { .. } | OwnershipError::ProcessUnavailable { .. } => None,
        }
    }
}
