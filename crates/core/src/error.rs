use thiserror::Error;

use crate::dataset::DatasetKind;

/// Failures that abort either the whole dashboard or a single chart.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The host environment is missing something every chart needs.
    #[error("environment unavailable: {0}")]
    Environment(String),

    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("failed to parse {}: {source}", kind.path())]
    Parse {
        kind: DatasetKind,
        #[source]
        source: serde_json::Error,
    },

    /// A chart anchor element is absent; only that chart is skipped.
    #[error("missing DOM anchor #{0}")]
    MissingAnchor(String),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("topology has no objects")]
    NoObjects,

    #[error("arc index {index} out of range ({len} arcs)")]
    ArcOutOfRange { index: i64, len: usize },
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
