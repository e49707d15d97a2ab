pub mod policy;
pub mod store;

pub use policy::*;
pub use store::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum EscalationError {
    #[error("Alert persistence failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Alert store rejected the alert: {0}")]
    Store(String),
}
