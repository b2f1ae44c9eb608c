//! Error types for the dashboard.

use xrsk_bridges::BridgeError;

/// All errors that can reach a dashboard caller.
#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
