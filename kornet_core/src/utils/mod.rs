//! Small helpers shared across the crate
pub mod hashing;
pub mod ratio;
