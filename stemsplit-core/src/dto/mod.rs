//! Data Transfer Objects for the HTTP API
//!
//! Request and response bodies exchanged between the server and its clients.
//! Field names are camelCase on the wire.

pub mod job;
pub mod upload;
