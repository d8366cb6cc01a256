//! Port traits at the I/O seams of the domain.

pub mod archive_port;
pub mod config_port;
pub mod export_port;
