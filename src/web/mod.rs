// Web server module
// Handles the HTTP API for image records and serves the uploaded files

mod app;
mod error;
mod extract_request_data;
mod handlers;
mod listeners;
mod models;

pub use app::create_app;
pub use listeners::create_listener;

use crate::{store::ImageStore, uploads::UploadsDir};
use std::sync::Arc;

pub type SharedImageStore = Arc<dyn ImageStore>;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub store: SharedImageStore,
    pub uploads: Arc<UploadsDir>,
}

impl AppState {
    pub fn new(store: SharedImageStore, uploads: UploadsDir) -> Self {
        Self {
            store,
            uploads: Arc::new(uploads),
        }
    }
}
