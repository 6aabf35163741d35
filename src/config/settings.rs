//! Application settings configuration.

use serde::{Deserialize, Serialize};

use crate::api::types::{AiProvider, TestType};

/// How long validation banners stay on screen by default.
pub const DEFAULT_BANNER_SECONDS: u64 = 5;

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// AI provider preselected on the generator screens.
    #[serde(with = "provider_name")]
    pub default_ai_provider: AiProvider,
    /// Test type preselected on the test case screen.
    pub default_test_type: TestType,
    /// Project key that generated tasks are submitted to.
    pub default_project_key: Option<String>,
    /// Seconds before a transient banner disappears.
    pub banner_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_ai_provider: AiProvider::Gemini,
            default_test_type: TestType::Api,
            default_project_key: None,
            banner_seconds: DEFAULT_BANNER_SECONDS,
        }
    }
}

/// Providers are written by name in the config file.
mod provider_name {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::api::types::AiProvider;

    pub fn serialize<S: Serializer>(provider: &AiProvider, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&provider.name().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AiProvider, D::Error> {
        let name = String::deserialize(deserializer)?;
        AiProvider::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown AI provider '{}'", name)))
    }
}
