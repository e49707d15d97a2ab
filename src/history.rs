//! Validation history access.
//!
//! `ValidationHistory` is the narrow read/write surface callers use to
//! record outcomes and review past validations. Retention pruning and the
//! critical-flag lookback queries stay in the repository layer; they are
//! maintenance concerns, not part of this surface.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{StoredValidation, StoredValidationFlag, ValidationResult, ValidationStats};

/// Persistent record of validation outcomes for a patient.
pub trait ValidationHistory {
    /// Record a validation outcome and its flags. Returns the stored id.
    fn save(&self, patient_id: &str, result: &ValidationResult) -> Result<Uuid, DatabaseError>;

    /// Most recent validations, newest first.
    fn recent(&self, patient_id: &str, limit: usize)
        -> Result<Vec<StoredValidation>, DatabaseError>;

    /// One validation with its flags, most severe flags first.
    fn with_flags(
        &self,
        validation_id: &Uuid,
    ) -> Result<(StoredValidation, Vec<StoredValidationFlag>), DatabaseError>;

    /// The newest validation with flags, or None if never validated.
    fn latest(
        &self,
        patient_id: &str,
    ) -> Result<Option<(StoredValidation, Vec<StoredValidationFlag>)>, DatabaseError>;

    /// Aggregate counts across the patient's history.
    fn stats(&self, patient_id: &str) -> Result<ValidationStats, DatabaseError>;
}

/// History over a borrowed connection, backed by the validation repository.
pub struct SqliteValidationHistory<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteValidationHistory<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ValidationHistory for SqliteValidationHistory<'_> {
    fn save(&self, patient_id: &str, result: &ValidationResult) -> Result<Uuid, DatabaseError> {
        db::insert_validation(self.conn, patient_id, result)
    }

    fn recent(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredValidation>, DatabaseError> {
        db::get_recent_validations(self.conn, patient_id, limit)
    }

    fn with_flags(
        &self,
        validation_id: &Uuid,
    ) -> Result<(StoredValidation, Vec<StoredValidationFlag>), DatabaseError> {
        db::get_validation_with_flags(self.conn, validation_id)
    }

    fn latest(
        &self,
        patient_id: &str,
    ) -> Result<Option<(StoredValidation, Vec<StoredValidationFlag>)>, DatabaseError> {
        db::get_latest_validation(self.conn, patient_id)
    }

    fn stats(&self, patient_id: &str) -> Result<ValidationStats, DatabaseError> {
        db::get_validation_stats(self.conn, patient_id)
    }
}
