// libs/scheduling-cell/src/state.rs
use std::sync::Arc;

use directory_cell::{HttpProfessionalDirectory, ProfessionalDirectory};
use shared_config::AppConfig;

use crate::store::AppointmentStore;

/// Shared state for the scheduling cell: configuration, the appointment
/// store, and the professional directory adapter.
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<AppointmentStore>,
    pub directory: Arc<dyn ProfessionalDirectory>,
}

impl SchedulingState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let directory = Arc::new(HttpProfessionalDirectory::new(&config));
        Self::with_directory(config, directory)
    }

    /// Used by tests and local development to substitute the directory.
    pub fn with_directory(
        config: Arc<AppConfig>,
        directory: Arc<dyn ProfessionalDirectory>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(AppointmentStore::new()),
            directory,
        }
    }
}
