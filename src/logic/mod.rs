pub mod charts;
pub mod classifier;
pub mod data_sync;
pub mod engine;
pub mod history;
pub mod probes;
pub mod solar_clock;

pub use classifier::StatusClassifier;
pub use data_sync::{DataSyncService, FeedSnapshot};
pub use engine::{evaluate_with, target_bands, PolicyEngine};
pub use history::{HistoryQuery, LocationFilter};
pub use solar_clock::SolarClock;
