//! Core domain types
//!
//! These types represent the separation jobs tracked by the server and are
//! shared with clients that poll them.

pub mod job;
pub mod media;
