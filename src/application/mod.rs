//! Application layer - Services that use ports.

pub mod publisher;
