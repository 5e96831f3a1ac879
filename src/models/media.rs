use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const DEFAULT_PREVIEW_DURATION: i64 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct UploadRequest {
    pub file: Option<String>,
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
    pub size: usize,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub photos: Option<Vec<Value>>,
    pub duration: Option<Number>,
    pub animation_type: Option<String>,
    pub transition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSettings {
    /// Seconds per photo, echoed as sent (integer or fractional).
    pub duration: Number,
    pub animation_type: String,
    pub transition: String,
}

impl PreviewRequest {
    pub fn settings(&self) -> PreviewSettings {
        PreviewSettings {
            duration: self
                .duration
                .clone()
                .unwrap_or_else(|| Number::from(DEFAULT_PREVIEW_DURATION)),
            animation_type: self
                .animation_type
                .clone()
                .unwrap_or_else(|| crate::models::DEFAULT_ANIMATION.to_string()),
            transition: self
                .transition
                .clone()
                .unwrap_or_else(|| crate::models::DEFAULT_TRANSITION.to_string()),
        }
    }
}

impl PreviewSettings {
    /// Total length for `photo_count` photos. Integer durations multiply
    /// exactly; `None` when the product does not fit.
    pub fn total_duration(&self, photo_count: usize) -> Option<Number> {
        if let Some(seconds) = self.duration.as_i64() {
            let count = i64::try_from(photo_count).ok()?;
            return seconds.checked_mul(count).map(Number::from);
        }
        if let Some(seconds) = self.duration.as_u64() {
            let count = u64::try_from(photo_count).ok()?;
            return seconds.checked_mul(count).map(Number::from);
        }
        let seconds = self.duration.as_f64()?;
        Number::from_f64(seconds * photo_count as f64)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub video_id: String,
    pub preview_url: String,
    pub video_url: String,
    pub status: String,
    pub duration: Number,
    pub settings: PreviewSettings,
}
