// Core business logic module

pub mod config;
pub mod network_monitor;

// Re-export commonly used items
pub use config::AppConfig;
pub use network_monitor::{NetworkMonitor, NetworkStatusInfo};
