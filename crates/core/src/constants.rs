//! Storage layout constants shared across the core services.

/// Subdirectory of the clinic data dir holding appointment documents.
pub const APPOINTMENTS_DIR_NAME: &str = "appointments";

/// Subdirectory of the clinic data dir holding doctor documents.
pub const DOCTORS_DIR_NAME: &str = "doctors";

/// Subdirectory of the clinic data dir holding user account documents.
pub const USERS_DIR_NAME: &str = "users";

/// Document file name inside each appointment record directory.
pub const APPOINTMENT_FILE_NAME: &str = "appointment.json";

/// Document file name inside each doctor record directory.
pub const DOCTOR_FILE_NAME: &str = "doctor.json";

/// Document file name inside each user account record directory.
pub const USER_FILE_NAME: &str = "user.json";
