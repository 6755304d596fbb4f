pub mod memory_cache;
pub mod sweeper;
