pub mod config;
pub mod response_data;
pub mod sim_params;

// Re-export key types for easier use by dependent crates
pub use config::{ResponseConfig, SystemConfig};
pub use response_data::{ResponseData, RESPONSE_FILE};
pub use sim_params::{SimParams, DURATION_S, NUM_SAMPLES};
