//! HealthGuard: medication regimen safety validation.
//!
//! Validates a patient's medication regimen against demographic risk rules
//! and, when a generative client is configured, an AI clinical reasoning
//! pass with deterministic fallback. Findings escalate to persistent
//! health alerts and every outcome lands in the validation history store.

pub mod config;
pub mod db;
pub mod demographics;
pub mod escalation;
pub mod genai;
pub mod history;
pub mod models;
pub mod validator;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedding applications.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate default.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
