// Observation store and location estimation

mod estimator;
mod sample;
mod store;

pub use estimator::{estimate, Domain, LocationEstimate};
pub use sample::{LocationSource, Sample};
pub use store::{ObservationStore, DEFAULT_WINDOW_MS};
