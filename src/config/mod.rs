pub mod tracker;

pub use tracker::{TrackerConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH, ENV_REFRESH_SECS};
