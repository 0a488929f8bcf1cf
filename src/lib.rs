#![forbid(unsafe_code)]

//! Reviewer console for Pinnacle English Center teacher requests.
//!
//! Teachers ask to reschedule a session, hand it to a substitute, or change
//! its delivery modality; academic staff approve or reject. This crate holds
//! the typed client for the request API and the review workflow on top.

pub mod api;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod models;
pub mod notify;
pub mod registry;
pub mod workflow;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
