//! Utility modules for input development.

pub mod memory;

// Re-export commonly used types
pub use memory::MemoryTransport;
