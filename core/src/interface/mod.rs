pub mod detection;
pub mod history;
pub mod model;

pub use detection::{AlertStatus, DetectionEvent, DetectionKind};
pub use history::{CompassDirection, ConfidenceBand, DetectionHistoryRecord};
pub use model::{ModelPrediction, ModelStatus};
