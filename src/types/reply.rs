//! Specialist endpoint payload.

use super::Specialist;
use serde::{Deserialize, Serialize};

/// Response body of a specialist endpoint.
///
/// Handlers fill in `success`, `advice` and `kind`; the caching pipeline owns
/// the `cached`, `weeks_since_cache`, `weight_difference` and `generated_at`
/// annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Specialist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_since_cache: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_difference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl SpecialistReply {
    pub fn advice(kind: Specialist, text: impl Into<String>) -> Self {
        Self {
            success: true,
            advice: Some(text.into()),
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn failure(kind: Specialist, error: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: Some(kind),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// True when the reply carries non-empty advice text.
    pub fn has_advice(&self) -> bool {
        self.advice.as_deref().is_some_and(|a| !a.is_empty())
    }
}
