//! Domain model module declarations.

pub mod candidate;
pub mod decision;
pub mod request;
pub mod resource;
pub mod reviewer;
