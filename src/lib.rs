//! Candidate Intake: voice recruiter agent core.
//!
//! Collects a candidate profile over a realtime conversation and persists it
//! exactly once.

pub mod config;
pub mod context;
pub mod error;
pub mod intake;
pub mod logging;
pub mod routes;
pub mod session;
pub mod store;
pub mod tools;
