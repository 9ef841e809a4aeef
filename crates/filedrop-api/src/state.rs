//! Application state shared by all handlers.

use crate::flash::FlashStore;
use crate::services::upload::UploadService;
use filedrop_core::Config;
use filedrop_storage::BatchStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn BatchStore>,
    pub upload_service: UploadService,
    pub flash: FlashStore,
}
