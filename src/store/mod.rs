//! Profile persistence — the store capability and an in-memory backend.

pub mod memory;
pub mod traits;

pub use memory::MemoryProfileStore;
pub use traits::ProfileStore;
