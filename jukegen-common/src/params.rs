//! Generation parameter model
//!
//! `TrackSettings` holds the process-scoped defaults every new queue item is
//! stamped from; `SongRequest` is the outbound request body built from one
//! item's snapshot. The two are kept separate because settings edits must
//! never reach items that were already enqueued.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default track length in seconds when nothing else is specified
pub const DEFAULT_DURATION_SECS: u32 = 30;

/// Mutable generation defaults, snapshotted at item-creation time.
///
/// Optional fields left as `None` are omitted from the outbound request
/// entirely; the backend must not see explicit nulls. Empty strings are
/// treated as unset when the request is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackSettings {
    /// Free-text style/genre prompt
    pub caption: String,
    /// Track length in seconds
    pub duration: u32,
    pub lyrics: Option<String>,
    pub bpm: Option<u32>,
    pub key: Option<String>,
    pub genre: Option<String>,
    pub top_k: Option<u32>,
    pub top_p: Option<f64>,
    pub temperature: Option<f64>,
    pub cfg_scale: Option<f64>,
    pub seed: Option<i64>,
    pub model: Option<String>,
    pub batch_size: Option<u32>,
    pub inference_steps: Option<u32>,
    pub thinking: Option<bool>,
    pub use_format: Option<bool>,
    pub audio_format: Option<String>,
    pub time_signature: Option<String>,
    pub use_random_seed: Option<bool>,
    pub lm_temperature: Option<f64>,
    pub lm_cfg_scale: Option<f64>,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            caption: "A jazz fusion piece with saxophone".to_string(),
            duration: DEFAULT_DURATION_SECS,
            lyrics: None,
            bpm: None,
            key: None,
            genre: None,
            top_k: None,
            top_p: None,
            temperature: None,
            cfg_scale: None,
            seed: None,
            model: None,
            batch_size: Some(1),
            inference_steps: None,
            thinking: None,
            use_format: None,
            audio_format: None,
            time_signature: None,
            use_random_seed: None,
            lm_temperature: None,
            lm_cfg_scale: None,
        }
    }
}

impl TrackSettings {
    /// Validate settings before they are used as an item template
    pub fn validate(&self) -> Result<()> {
        if self.caption.trim().is_empty() {
            return Err(Error::InvalidInput("caption must not be empty".to_string()));
        }
        if self.duration == 0 {
            return Err(Error::InvalidInput("duration must be at least 1 second".to_string()));
        }
        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err(Error::InvalidInput("batch_size must be at least 1".to_string()));
            }
        }
        Ok(())
    }
}

/// Outbound task-creation request body.
///
/// Every optional field carries `skip_serializing_if` so unset parameters
/// are absent from the JSON payload rather than serialized as null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongRequest {
    pub caption: String,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_format: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_random_seed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lm_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lm_cfg_scale: Option<f64>,
}

impl SongRequest {
    /// Build a request body from a settings snapshot.
    ///
    /// Empty strings count as unset, matching the backend contract that
    /// optional text parameters are either meaningful or absent.
    pub fn from_settings(settings: &TrackSettings) -> Self {
        Self {
            caption: settings.caption.clone(),
            duration: settings.duration,
            lyrics: non_empty(&settings.lyrics),
            bpm: settings.bpm,
            key: non_empty(&settings.key),
            genre: non_empty(&settings.genre),
            top_k: settings.top_k,
            top_p: settings.top_p,
            temperature: settings.temperature,
            cfg_scale: settings.cfg_scale,
            seed: settings.seed,
            model: non_empty(&settings.model),
            batch_size: settings.batch_size,
            inference_steps: settings.inference_steps,
            thinking: settings.thinking,
            use_format: settings.use_format,
            audio_format: non_empty(&settings.audio_format),
            time_signature: non_empty(&settings.time_signature),
            use_random_seed: settings.use_random_seed,
            lm_temperature: settings.lm_temperature,
            lm_cfg_scale: settings.lm_cfg_scale,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_optionals_are_absent_from_payload() {
        let settings = TrackSettings {
            caption: "lofi beats".to_string(),
            duration: 45,
            batch_size: None,
            ..Default::default()
        };

        let body = serde_json::to_value(SongRequest::from_settings(&settings)).unwrap();
        let object = body.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(object["caption"], "lofi beats");
        assert_eq!(object["duration"], 45);
        assert!(!object.contains_key("lyrics"));
        assert!(!object.contains_key("seed"));
    }

    #[test]
    fn set_optionals_are_serialized() {
        let settings = TrackSettings {
            caption: "driving techno".to_string(),
            bpm: Some(132),
            key: Some("A Minor".to_string()),
            temperature: Some(0.7),
            seed: Some(42),
            ..Default::default()
        };

        let body = serde_json::to_value(SongRequest::from_settings(&settings)).unwrap();

        assert_eq!(body["bpm"], 132);
        assert_eq!(body["key"], "A Minor");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["seed"], 42);
        assert_eq!(body["batch_size"], 1);
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let settings = TrackSettings {
            caption: "ambient pads".to_string(),
            lyrics: Some("".to_string()),
            genre: Some("   ".to_string()),
            time_signature: Some("3/4".to_string()),
            ..Default::default()
        };

        let body = serde_json::to_value(SongRequest::from_settings(&settings)).unwrap();
        let object = body.as_object().unwrap();

        assert!(!object.contains_key("lyrics"));
        assert!(!object.contains_key("genre"));
        assert_eq!(object["time_signature"], "3/4");
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut settings = TrackSettings::default();
        assert!(settings.validate().is_ok());

        settings.caption = "  ".to_string();
        assert!(settings.validate().is_err());

        settings = TrackSettings::default();
        settings.duration = 0;
        assert!(settings.validate().is_err());

        settings = TrackSettings::default();
        settings.batch_size = Some(0);
        assert!(settings.validate().is_err());
    }
}
