//! HTTP handlers.

pub mod authentication;
pub mod credential;
pub mod metrics;
pub mod operation;
pub mod organization;
pub mod otp;
pub mod step_definition;
pub mod user;
