// API-specific data models for the web server

use serde::{Deserialize, Serialize};

/// Acknowledgment returned by a successful delete
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeleteImageResponse {
    pub message: String,
}

impl Default for DeleteImageResponse {
    fn default() -> Self {
        Self {
            message: "Image deleted successfully".to_string(),
        }
    }
}
