//! Live views. Each owns its state and its samplers for as long as it is
//! mounted; nothing is shared between views.

pub mod dashboard;
pub mod monitor;
pub mod system;

pub use dashboard::{DashboardHandle, DashboardView};
pub use monitor::{MonitorHandle, MonitorView};
pub use system::{SystemHandle, SystemView};
