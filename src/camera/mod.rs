// Camera domain — capture framework seam and its backends.

pub mod backend;
pub mod dummy;
pub mod error;
pub mod platform;
pub mod types;
