//! Appointment model and read-time status projection.
//!
//! The stored model is a two-state machine: `Confirmed` at creation, `Cancelled` after a
//! soft cancel, and nothing else. "Completed" is never persisted; it is a read-time
//! projection derived by comparing the appointment date with the current calendar date, see
//! [`classify`].

use crate::record_id::RecordId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored lifecycle state of an appointment.
///
/// The only transition is `Confirmed -> Cancelled`; there is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
}

/// Read-time classification of an appointment.
///
/// Unlike [`AppointmentStatus`], this includes `Completed`, which is derived and never
/// written back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DerivedStatus {
    Confirmed,
    Cancelled,
    Completed,
}

/// A booked appointment, owned by exactly one user.
///
/// Doctor fields are a denormalized snapshot taken at booking time, not a live reference;
/// later catalog edits do not retroactively change past appointments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Opaque identifier, assigned at creation.
    #[schema(value_type = String)]
    pub id: RecordId,
    /// Identifier of the authenticated caller who created the record. Every read and write
    /// is scoped by this field.
    #[schema(value_type = String)]
    pub owner_id: RecordId,
    /// Free-text doctor reference; not validated against the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    pub doctor_name: String,
    pub specialization: String,
    pub clinic: String,
    /// Requested calendar date, `YYYY-MM-DD` string form.
    pub date: String,
    /// Requested slot as a display string, e.g. `"10:00 AM"`.
    pub time: String,
    pub consultation_fee: f64,
    pub reason: String,
    pub status: AppointmentStatus,
    /// Server-clock calendar date of creation.
    #[schema(value_type = String)]
    pub booked_at: NaiveDate,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// Classifies an appointment for display as of `today`.
///
/// Cancelled records stay `Cancelled` regardless of date. Confirmed records whose date is
/// strictly before `today` project to `Completed`; everything else (including dates that
/// fail to parse) stays `Confirmed`.
pub fn classify(appointment: &Appointment, today: NaiveDate) -> DerivedStatus {
    match appointment.status {
        AppointmentStatus::Cancelled => DerivedStatus::Cancelled,
        AppointmentStatus::Confirmed => {
            match NaiveDate::parse_from_str(&appointment.date, "%Y-%m-%d") {
                Ok(date) if date < today => DerivedStatus::Completed,
                _ => DerivedStatus::Confirmed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(date: &str, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: RecordId::new(),
            owner_id: RecordId::new(),
            doctor_id: None,
            doctor_name: "Dr. X".into(),
            specialization: "Cardiologists".into(),
            clinic: "C1".into(),
            date: date.into(),
            time: "10:00 AM".into(),
            consultation_fee: 1000.0,
            reason: "Chest pain evaluation".into(),
            status,
            booked_at: now.date_naive(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_classify_cancelled_wins_over_date() {
        let apt = appointment("2000-01-01", AppointmentStatus::Cancelled);
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(classify(&apt, today), DerivedStatus::Cancelled);
    }

    #[test]
    fn test_classify_past_confirmed_is_completed() {
        let apt = appointment("2026-02-05", AppointmentStatus::Confirmed);
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(classify(&apt, today), DerivedStatus::Completed);
    }

    #[test]
    fn test_classify_today_and_future_stay_confirmed() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let same_day = appointment("2026-03-01", AppointmentStatus::Confirmed);
        assert_eq!(classify(&same_day, today), DerivedStatus::Confirmed);

        let future = appointment("2026-04-15", AppointmentStatus::Confirmed);
        assert_eq!(classify(&future, today), DerivedStatus::Confirmed);
    }

    #[test]
    fn test_classify_unparsable_date_stays_confirmed() {
        let apt = appointment("next tuesday", AppointmentStatus::Confirmed);
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(classify(&apt, today), DerivedStatus::Confirmed);
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let apt = appointment("2026-03-01", AppointmentStatus::Confirmed);
        let json = serde_json::to_value(&apt).unwrap();

        assert!(json.get("ownerId").is_some());
        assert!(json.get("doctorName").is_some());
        assert!(json.get("consultationFee").is_some());
        assert!(json.get("bookedAt").is_some());
        assert_eq!(json["status"], "Confirmed");
        // doctorId is omitted entirely when absent
        assert!(json.get("doctorId").is_none());
    }
}
