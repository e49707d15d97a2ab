//! SQLite-backed alert store.

use rusqlite::Connection;

use super::policy::AlertStore;
use super::EscalationError;
use crate::db;
use crate::models::HealthAlert;

/// Alert store over a borrowed connection, writing through the health
/// alert repository.
pub struct SqliteAlertStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAlertStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AlertStore for SqliteAlertStore<'_> {
    fn insert(&self, alert: &HealthAlert) -> Result<(), EscalationError> {
        db::insert_health_alert(self.conn, alert)?;
        Ok(())
    }
}
