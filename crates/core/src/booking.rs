//! The appointment booking workflow.
//!
//! Create, list and soft-cancel operations over the appointment collection, always scoped to
//! the owning user. There is deliberately no slot-exclusivity check: two callers booking the
//! same doctor/date/time both succeed, and resolving such collisions is out of scope for the
//! store (handled out-of-band by the clinic).

use crate::appointment::{Appointment, AppointmentStatus};
use crate::config::CoreConfig;
use crate::constants::APPOINTMENT_FILE_NAME;
use crate::error::{BookingError, BookingResult};
use crate::record_id::RecordId;
use crate::store;
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use utoipa::ToSchema;

/// Booking payload as submitted by the caller.
///
/// All fields are optional at the wire level; [`BookingService::create`] enforces the
/// presence checks so that validation failures are reported uniformly. There is no
/// owner field here; ownership is always taken from the authenticated caller.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[serde(default)]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub clinic: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Returns the field value when present and non-empty.
///
/// Empty strings count as missing; whitespace-only strings do not. Inputs are stored as
/// submitted, without trimming.
fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Pure booking data operations - no API concerns
#[derive(Clone)]
pub struct BookingService {
    cfg: Arc<CoreConfig>,
}

impl BookingService {
    /// Creates a new instance of BookingService.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Creates an appointment owned by `owner_id`.
    ///
    /// Validation rejects a payload when any of doctor name, specialization, clinic, date,
    /// time, consultation fee or reason is missing, an empty string, or (for the fee) zero.
    /// No further checks are applied: past dates, free-form time strings and short reasons
    /// are accepted as-is. The optional doctor id is carried through unvalidated.
    ///
    /// On success the record is persisted with `Confirmed` status and a `booked_at` date
    /// taken from the server clock, and returned in full.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` on a failed presence check, or a storage error
    /// if the single document write fails.
    pub fn create(
        &self,
        owner_id: &RecordId,
        input: NewAppointment,
    ) -> BookingResult<Appointment> {
        let missing = || BookingError::InvalidInput("Missing appointment details".into());

        let doctor_name = required_text(input.doctor_name).ok_or_else(missing)?;
        let specialization = required_text(input.specialization).ok_or_else(missing)?;
        let clinic = required_text(input.clinic).ok_or_else(missing)?;
        let date = required_text(input.date).ok_or_else(missing)?;
        let time = required_text(input.time).ok_or_else(missing)?;
        let reason = required_text(input.reason).ok_or_else(missing)?;
        let consultation_fee = match input.consultation_fee {
            Some(fee) if fee != 0.0 => fee,
            _ => return Err(missing()),
        };

        let appointments_dir = self.cfg.appointments_dir();
        let (id, record_dir) = store::allocate_record_dir(&appointments_dir, RecordId::new)?;

        let now = Utc::now();
        let appointment = Appointment {
            id,
            owner_id: owner_id.clone(),
            doctor_id: input.doctor_id,
            doctor_name,
            specialization,
            clinic,
            date,
            time,
            consultation_fee,
            reason,
            status: AppointmentStatus::Confirmed,
            booked_at: now.date_naive(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = store::write_document(
            &record_dir.join(APPOINTMENT_FILE_NAME),
            &appointment,
        ) {
            let _ = fs::remove_dir_all(&record_dir);
            return Err(e);
        }

        Ok(appointment)
    }

    /// Lists all appointments owned by `owner_id`.
    ///
    /// Results are ordered by `date` ascending, then `time` ascending. Both orderings are
    /// plain string comparisons: `YYYY-MM-DD` dates sort correctly that way, while display
    /// times like `"02:00 PM"` sort before `"10:00 AM"`. The time ordering matches what
    /// callers have always seen and is kept as-is.
    ///
    /// Unparsable documents are skipped with a warning; a missing collection yields an
    /// empty list.
    pub fn list_for_owner(&self, owner_id: &RecordId) -> Vec<Appointment> {
        let mut appointments: Vec<Appointment> =
            store::scan_collection(&self.cfg.appointments_dir(), APPOINTMENT_FILE_NAME)
                .into_iter()
                .filter(|a: &Appointment| a.owner_id == *owner_id)
                .collect();

        appointments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
        appointments
    }

    /// Soft-cancels the appointment `(id, owner_id)`.
    ///
    /// A record owned by a different caller is treated exactly like a missing one, so the
    /// existence of other users' appointments is never leaked. Cancelling an
    /// already-cancelled record succeeds again and re-persists the same terminal status.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotFound` when the record is absent or owned by someone else,
    /// or a storage error if the read or write fails.
    pub fn cancel(&self, owner_id: &RecordId, id: &RecordId) -> BookingResult<Appointment> {
        let path =
            store::document_path(&self.cfg.appointments_dir(), id, APPOINTMENT_FILE_NAME);

        let mut appointment: Appointment = store::read_document(&path)?;
        if appointment.owner_id != *owner_id {
            return Err(BookingError::NotFound);
        }

        appointment.status = AppointmentStatus::Cancelled;
        appointment.updated_at = Utc::now();
        store::write_document(&path, &appointment)?;

        Ok(appointment)
    }
}
