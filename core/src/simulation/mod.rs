pub mod detector;
pub mod ensemble;
pub mod history;
pub mod radar;
pub mod sampler;
pub mod system;
pub mod waveform;

pub use detector::{DetectionSimulator, DetectorConfig, ResetPolicy};
pub use ensemble::{EnsembleConfig, EnsembleVoting};
pub use history::{query_history, HistoryPage, HistoryQuery, HistoryStats};
pub use radar::RadarSweep;
pub use sampler::PeriodicSampler;
pub use system::{startup_log, LogLevel, SystemLogEntry, SystemMetrics};
pub use waveform::{AudioFeatures, SignalGenerator, WaveformState};
