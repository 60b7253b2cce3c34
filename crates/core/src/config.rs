//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{APPOINTMENTS_DIR_NAME, DOCTORS_DIR_NAME, USERS_DIR_NAME};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    clinic_data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at the given clinic data directory.
    pub fn new(clinic_data_dir: PathBuf) -> Self {
        Self { clinic_data_dir }
    }

    pub fn clinic_data_dir(&self) -> &Path {
        &self.clinic_data_dir
    }

    pub fn appointments_dir(&self) -> PathBuf {
        self.clinic_data_dir.join(APPOINTMENTS_DIR_NAME)
    }

    pub fn doctors_dir(&self) -> PathBuf {
        self.clinic_data_dir.join(DOCTORS_DIR_NAME)
    }

    pub fn users_dir(&self) -> PathBuf {
        self.clinic_data_dir.join(USERS_DIR_NAME)
    }
}
