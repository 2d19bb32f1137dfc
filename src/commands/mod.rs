// Command handlers module
pub mod check;
pub mod serve;

// Re-exports for cleaner imports
pub use check::execute as check;
pub use serve::execute as serve;
