use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::validation::{Validation, ValidationSchemas, PLANET_SCHEMA};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Planet {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub diameter: i32,
    pub moon: i32,
    pub photo_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable planet fields, as accepted by `POST /planets` and `PUT /planets/:id`.
///
/// `description` distinguishes "absent" (`None`) from an explicit `null`
/// (`Some(None)`), so an update can keep or clear the stored value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanetData {
    pub name: String,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub diameter: i32,
    pub moon: i32,
}

impl PlanetData {
    pub fn new(name: impl Into<String>, diameter: i32, moon: i32) -> Self {
        Self {
            name: name.into(),
            description: None,
            diameter,
            moon,
        }
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = Some(description.map(str::to_string));
        self
    }

    /// Description to store on insert.
    pub fn initial_description(&self) -> Option<String> {
        self.description.clone().flatten()
    }
}

impl Validation for PlanetData {
    const SCHEMAS: ValidationSchemas = ValidationSchemas::body(PLANET_SCHEMA);
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
