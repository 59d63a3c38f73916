use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

/// Common error type for the simulation core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("no tokio runtime available to arm {0}")]
    NoRuntime(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{field}: {value:?} is not a number")]
    InvalidNumber { field: String, value: String },
    #[error("{field}: {value} outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type SimResult<T> = Result<T, SimError>;

/// A piece of view state advanced once per sampler tick.
///
/// Implementations never read the wall clock or a global RNG; both are handed
/// in so the same model runs under live timers and under the virtual clock.
pub trait TickModel {
    type Output;

    /// Cadence at which the owning view samples this model.
    fn interval(&self) -> Duration;

    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Self::Output;
}
