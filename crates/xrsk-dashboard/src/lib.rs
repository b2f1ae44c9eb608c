//! XRSK dashboard: page view models over the cached bridge table, rendered
//! as text or JSON, with an optional HTTP surface.

pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod pages;
pub mod transport;

pub use app::Dashboard;
pub use config::{resolve_source, DashboardConfig};
pub use error::{DashboardError, DashboardResult};
pub use pages::{render, Page};
