//! Stemsplit Core
//!
//! Core types shared by the Stemsplit server, client and CLI.
//!
//! This crate contains:
//! - Domain types: Job, JobStatus, StemResult and recognized media kinds
//! - DTOs: request/response bodies exchanged over the HTTP API

pub mod domain;
pub mod dto;
