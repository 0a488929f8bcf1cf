//! Eligible resource model: a room or online account usable by a session.

use serde::Serialize;
use serde_json::Value;

use crate::lookup::{first_i64, first_string};
use crate::{AppError, Result};

const ID: &[&str] = &["id", "resourceId", "resource.id"];
const NAME: &[&str] = &["name", "resourceName", "resource.name", "code"];
const RESOURCE_TYPE: &[&str] = &["resourceType", "type", "resource.resourceType"];
const CAPACITY: &[&str] = &["capacity", "maxCapacity", "resource.capacity"];

/// A resource valid for a specific session, time and modality.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EligibleResource {
    /// Resource identifier.
    pub id: i64,
    /// Display name (room code or account label).
    pub name: String,
    /// Resource kind (`ROOM`, `VIRTUAL`, ...).
    pub resource_type: Option<String>,
    /// Seat capacity, when the resource has one.
    pub capacity: Option<u32>,
}

impl EligibleResource {
    /// Decode a resource record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` if the record has no id.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let id = first_i64(raw, ID)
            .ok_or_else(|| AppError::Decode("resource record has no id".into()))?;
        Ok(Self {
            id,
            name: first_string(raw, NAME).unwrap_or_else(|| format!("Resource #{id}")),
            resource_type: first_string(raw, RESOURCE_TYPE),
            capacity: first_i64(raw, CAPACITY).and_then(|c| u32::try_from(c).ok()),
        })
    }
}
