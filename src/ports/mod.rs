//! Ports - Trait definitions for the outside world.

pub mod registry;
pub mod transcoder;
