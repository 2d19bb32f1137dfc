// Netmon Library - Public API

// Re-export error types
pub mod error;
pub use error::{NetmonError, Result};

// Module declarations
pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;

// Re-export commonly used types
pub use self::core::config::AppConfig;
pub use self::core::network_monitor::{MonitorState, NetworkMonitor, NetworkScheme};

// Initialize logging
pub fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}
