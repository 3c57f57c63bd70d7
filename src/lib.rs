pub mod abis;
pub mod chain;
pub mod config;
pub mod error;
pub mod models;
pub mod tracker;
pub mod utils;

pub use chain::{build_networks, NetworkConnection, NetworkLabel};
pub use config::Settings;
pub use error::{Error, Result};
pub use models::TrackingReport;
pub use tracker::Tracker;
