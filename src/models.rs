// Defines the image record kept for every upload and the patch applied by updates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing one uploaded image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    // Generated name of the stored file, original extension preserved.
    pub filename: String,
    // Public URL path the file is served from, e.g. "/uploads/<filename>".
    pub file_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn new(
        id: String,
        title: String,
        description: String,
        filename: String,
        file_path: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            description,
            filename,
            file_path,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a metadata patch and refreshes `updated_at`.
    pub fn apply(&mut self, patch: ImagePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.touch();
    }

    /// Refreshes `updated_at`, always moving it strictly forward.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Metadata changes requested by an update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ImagePatch {
    /// Builds a patch from submitted form values; empty values mean "keep".
    pub fn from_form(title: Option<String>, description: Option<String>) -> Self {
        Self {
            title: title.filter(|value| !value.is_empty()),
            description: description.filter(|value| !value.is_empty()),
        }
    }
}
