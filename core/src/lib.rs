//! Simulation core for the acoustic gunshot-detection operator dashboard.
//!
//! Every panel of the dashboard is backed by a small state machine advanced by
//! its own periodic sampler. The state machines here are pure and take their
//! randomness and clock explicitly, so they can be driven by live tokio timers
//! or by the offline virtual clock in the simulator.

pub mod interface;
pub mod math;
pub mod notify;
pub mod prelude;
pub mod settings;
pub mod simulation;
pub mod telemetry;

pub use prelude::{SimError, SimResult, TickModel};
