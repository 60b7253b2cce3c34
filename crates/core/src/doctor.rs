//! Doctor catalog model.

use crate::record_id::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default avatar used when a doctor is created without an image.
pub const DEFAULT_DOCTOR_IMAGE: &str = "👨‍⚕️";

/// A bookable provider in the catalog.
///
/// The booking workflow only reads denormalized snapshots of these fields at booking time;
/// it never joins against the catalog afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[schema(value_type = String)]
    pub id: RecordId,
    pub name: String,
    pub specialization_id: i64,
    pub specialization: String,
    pub qualifications: String,
    pub experience: String,
    pub consultation_fee: f64,
    /// Consultation duration in minutes.
    pub duration: i64,
    pub image: String,
    pub clinic: String,
    pub clinic_address: String,
    pub clinic_lat: f64,
    pub clinic_lng: f64,
    pub available: bool,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}
