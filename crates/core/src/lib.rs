//! Browser-free core of the Beyond the Arc dashboard: datasets, scales,
//! chart state and the story controller. The web app mounts what this crate
//! produces; the CLI renders it to SVG files.

pub mod charts;
pub mod color;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod format;
pub mod geo;
pub mod join;
pub mod model;
pub mod scale;
pub mod scene;
pub mod story;
pub mod tooltip;
pub mod transition;

pub use dashboard::{hero_metrics, Dashboard, HeroMetrics};
pub use dataset::{DatasetKind, Datasets};
pub use error::{DashboardError, Result};
