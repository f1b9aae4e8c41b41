// Repository module structure
pub mod errors;
mod in_memory;
mod profile;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use profile::{ProfileRepository, ProfileRepositoryTrait};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use profile::tests;
