//! Doctor catalog operations.
//!
//! The catalog is read-mostly: anyone may list providers, while creation and deletion are
//! reserved for administrators (the role check itself happens at the API boundary, not
//! here). Doctors are the only records that are ever hard-deleted.

use crate::config::CoreConfig;
use crate::constants::DOCTOR_FILE_NAME;
use crate::doctor::{Doctor, DEFAULT_DOCTOR_IMAGE};
use crate::error::{BookingError, BookingResult};
use crate::record_id::RecordId;
use crate::store;
use chrono::Utc;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use utoipa::ToSchema;

/// Catalog entry payload as submitted by an administrator.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specialization_id: Option<i64>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub clinic: Option<String>,
    #[serde(default)]
    pub clinic_address: Option<String>,
    #[serde(default)]
    pub clinic_lat: Option<f64>,
    #[serde(default)]
    pub clinic_lng: Option<f64>,
    #[serde(default)]
    pub available: Option<bool>,
}

fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Pure catalog data operations - no API concerns
#[derive(Clone)]
pub struct CatalogService {
    cfg: Arc<CoreConfig>,
}

impl CatalogService {
    /// Creates a new instance of CatalogService.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Lists all providers, newest first.
    ///
    /// Unparsable documents are skipped with a warning; a missing collection yields an
    /// empty list.
    pub fn list(&self) -> Vec<Doctor> {
        let mut doctors: Vec<Doctor> =
            store::scan_collection(&self.cfg.doctors_dir(), DOCTOR_FILE_NAME);
        doctors.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        doctors
    }

    /// Creates a catalog entry.
    ///
    /// All descriptive fields are required and must be non-empty (zero counts as missing
    /// for the numeric ones); the clinic coordinates must be finite numbers. `image`
    /// defaults to the standard avatar and `available` to true.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` when a required field is missing or the
    /// coordinates are invalid, or a storage error if the document write fails.
    pub fn create(&self, input: NewDoctor) -> BookingResult<Doctor> {
        let missing = || BookingError::InvalidInput("Missing doctor details".into());

        let name = required_text(input.name).ok_or_else(missing)?;
        let specialization = required_text(input.specialization).ok_or_else(missing)?;
        let qualifications = required_text(input.qualifications).ok_or_else(missing)?;
        let experience = required_text(input.experience).ok_or_else(missing)?;
        let clinic = required_text(input.clinic).ok_or_else(missing)?;
        let clinic_address = required_text(input.clinic_address).ok_or_else(missing)?;
        let specialization_id = match input.specialization_id {
            Some(id) if id != 0 => id,
            _ => return Err(missing()),
        };
        let consultation_fee = match input.consultation_fee {
            Some(fee) if fee != 0.0 => fee,
            _ => return Err(missing()),
        };
        let duration = match input.duration {
            Some(minutes) if minutes != 0 => minutes,
            _ => return Err(missing()),
        };

        let (clinic_lat, clinic_lng) = match (input.clinic_lat, input.clinic_lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
            _ => {
                return Err(BookingError::InvalidInput(
                    "Invalid clinic coordinates".into(),
                ))
            }
        };

        let doctors_dir = self.cfg.doctors_dir();
        let (id, record_dir) = store::allocate_record_dir(&doctors_dir, RecordId::new)?;

        let now = Utc::now();
        let doctor = Doctor {
            id,
            name,
            specialization_id,
            specialization,
            qualifications,
            experience,
            consultation_fee,
            duration,
            image: input.image.unwrap_or_else(|| DEFAULT_DOCTOR_IMAGE.into()),
            clinic,
            clinic_address,
            clinic_lat,
            clinic_lng,
            available: input.available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = store::write_document(&record_dir.join(DOCTOR_FILE_NAME), &doctor) {
            let _ = fs::remove_dir_all(&record_dir);
            return Err(e);
        }

        Ok(doctor)
    }

    /// Hard-deletes the catalog entry with the given id.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NotFound` when no such entry exists.
    pub fn delete(&self, id: &RecordId) -> BookingResult<()> {
        store::remove_record_dir(&self.cfg.doctors_dir(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cfg(dir: &TempDir) -> Arc<CoreConfig> {
        Arc::new(CoreConfig::new(dir.path().to_path_buf()))
    }

    fn valid_input() -> NewDoctor {
        NewDoctor {
            name: Some("Dr. Meera Shah".into()),
            specialization_id: Some(2),
            specialization: Some("Cardiologists".into()),
            qualifications: Some("MBBS, MD".into()),
            experience: Some("12 years".into()),
            consultation_fee: Some(1000.0),
            duration: Some(30),
            image: None,
            clinic: Some("City Heart Clinic".into()),
            clinic_address: Some("12 MG Road".into()),
            clinic_lat: Some(12.9716),
            clinic_lng: Some(77.5946),
            available: None,
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = CatalogService::new(test_cfg(&temp_dir));

        let doctor = service.create(valid_input()).expect("create should succeed");
        assert_eq!(doctor.image, DEFAULT_DOCTOR_IMAGE);
        assert!(doctor.available);
    }

    #[test]
    fn test_create_keeps_explicit_unavailability() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = CatalogService::new(test_cfg(&temp_dir));

        let doctor = service
            .create(NewDoctor {
                available: Some(false),
                ..valid_input()
            })
            .unwrap();
        assert!(!doctor.available);
    }

    #[test]
    fn test_create_rejects_missing_details() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = CatalogService::new(test_cfg(&temp_dir));

        for input in [
            NewDoctor {
                name: None,
                ..valid_input()
            },
            NewDoctor {
                specialization_id: Some(0),
                ..valid_input()
            },
            NewDoctor {
                qualifications: Some(String::new()),
                ..valid_input()
            },
            NewDoctor {
                consultation_fee: Some(0.0),
                ..valid_input()
            },
            NewDoctor {
                duration: None,
                ..valid_input()
            },
            NewDoctor {
                clinic_address: None,
                ..valid_input()
            },
        ] {
            let err = service.create(input).expect_err("create should fail");
            assert!(matches!(err, BookingError::InvalidInput(msg) if msg == "Missing doctor details"));
        }

        assert!(service.list().is_empty());
    }

    #[test]
    fn test_create_rejects_missing_coordinates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = CatalogService::new(test_cfg(&temp_dir));

        let err = service
            .create(NewDoctor {
                clinic_lat: None,
                ..valid_input()
            })
            .expect_err("create should fail");
        assert!(matches!(err, BookingError::InvalidInput(msg) if msg == "Invalid clinic coordinates"));
    }

    #[test]
    fn test_list_is_newest_first() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = CatalogService::new(test_cfg(&temp_dir));

        let first = service.create(valid_input()).unwrap();
        let second = service
            .create(NewDoctor {
                name: Some("Dr. Arjun Rao".into()),
                ..valid_input()
            })
            .unwrap();

        let listed = service.list();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[0].id, second.id);
    }

    #[test]
    fn test_delete_removes_entry() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = CatalogService::new(test_cfg(&temp_dir));

        let doctor = service.create(valid_input()).unwrap();
        service.delete(&doctor.id).expect("delete should succeed");
        assert!(service.list().is_empty());

        let err = service
            .delete(&doctor.id)
            .expect_err("second delete should fail");
        assert!(matches!(err, BookingError::NotFound));
    }
}
