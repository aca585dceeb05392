//! Filesystem helpers shared by resources.
pub mod fs;
