//! MongoDB connection management and health probes.

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{connect, connect_from_config, connect_from_config_with_retry};
pub use health::{HealthStatus, check_health_detailed, list_collection_names};

pub use mongodb::{Client, Collection, Database};
