//! Data types for the generation backend API.
//!
//! These types mirror the JSON bodies exchanged with the backend. Field names
//! follow the backend's camelCase convention through serde renames.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Authentication
// ============================================================================

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// The Google identity credential (ID token).
    pub google_token: String,
}

/// Tokens returned by a successful login.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token sent on every authenticated call.
    pub access_token: String,
    /// Refresh token stored alongside the access token.
    #[serde(default)]
    pub refresh_token: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Issues
// ============================================================================

/// An issue fetched from the issue tracker through the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    /// Issue summary.
    pub title: String,
    /// Rich-text (HTML) description, if any.
    #[serde(default)]
    pub description: Option<String>,
    /// Display name of the assignee.
    #[serde(default)]
    pub assignee: String,
    /// Workflow status name.
    #[serde(default)]
    pub status: String,
    /// Issue type name (e.g. "Story", "Epic").
    #[serde(rename = "type", default)]
    pub issue_type: String,
}

impl Issue {
    /// Whether this issue is an epic and should be split into smaller items.
    pub fn is_epic(&self) -> bool {
        self.issue_type.eq_ignore_ascii_case("epic")
    }
}

// ============================================================================
// Generated artifacts
// ============================================================================

/// A generated test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Short title of the test case.
    pub title: String,
    /// Steps to perform.
    #[serde(default)]
    pub description: String,
    /// Expected result.
    #[serde(default)]
    pub result: String,
}

/// Priority of a generated task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// The wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// The next priority, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    /// The previous priority, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated task belonging to a task group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    /// Environment the task targets (e.g. "backend", "frontend").
    #[serde(default)]
    pub environment: String,
}

/// A generated epic with its ordered tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroup {
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Kind of test cases to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    #[default]
    Api,
    Web,
}

impl TestType {
    /// The numeric value the backend expects in `testType`.
    pub fn query_value(&self) -> u8 {
        match self {
            TestType::Api => 0,
            TestType::Web => 1,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TestType::Api => "API",
            TestType::Web => "Web",
        }
    }

    /// Switch to the other test type.
    pub fn toggle(self) -> Self {
        match self {
            TestType::Api => TestType::Web,
            TestType::Web => TestType::Api,
        }
    }
}

// ============================================================================
// AI providers
// ============================================================================

/// An AI provider the backend can generate with.
///
/// Sent as its numeric id (`1` Gemini, `2` ChatGPT). The backend answers with
/// either the number or the upper-case name, so both are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AiProvider {
    #[default]
    Gemini,
    ChatGpt,
}

impl AiProvider {
    /// Every provider type the client knows about.
    pub const ALL: [AiProvider; 2] = [AiProvider::Gemini, AiProvider::ChatGpt];

    /// The numeric id used in `iaType` and configuration records.
    pub fn id(&self) -> u8 {
        match self {
            AiProvider::Gemini => 1,
            AiProvider::ChatGpt => 2,
        }
    }

    /// Look up a provider by numeric id.
    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(AiProvider::Gemini),
            2 => Some(AiProvider::ChatGpt),
            _ => None,
        }
    }

    /// Look up a provider by its backend name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GEMINI" => Some(AiProvider::Gemini),
            "CHATGPT" => Some(AiProvider::ChatGpt),
            _ => None,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "GEMINI",
            AiProvider::ChatGpt => "CHATGPT",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for AiProvider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for AiProvider {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(u64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => AiProvider::from_id(id)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown AI provider id {}", id))),
            Raw::Name(name) => AiProvider::from_name(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown AI provider '{}'", name))),
        }
    }
}

/// An entry of `GET /api/ia/select`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AiOption {
    /// Provider type.
    #[serde(alias = "id", alias = "type")]
    pub provider: AiProvider,
    /// Display name, when the backend sends one.
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================================
// User configuration
// ============================================================================

/// Flavor of the issue tracker installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerType {
    #[default]
    Cloud,
    Server,
}

impl ServerType {
    /// Wire value in `jiraVersion`.
    pub fn version(&self) -> u8 {
        match self {
            ServerType::Cloud => 1,
            ServerType::Server => 0,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ServerType::Cloud => "Cloud",
            ServerType::Server => "Server",
        }
    }

    /// Switch to the other server type.
    pub fn toggle(self) -> Self {
        match self {
            ServerType::Cloud => ServerType::Server,
            ServerType::Server => ServerType::Cloud,
        }
    }
}

impl Serialize for ServerType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.version())
    }
}

impl<'de> Deserialize<'de> for ServerType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Version(u64),
            Name(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Version(1) => ServerType::Cloud,
            Raw::Version(_) => ServerType::Server,
            Raw::Name(name) if name.eq_ignore_ascii_case("cloud") => ServerType::Cloud,
            Raw::Name(_) => ServerType::Server,
        })
    }
}

/// The signed-in user as returned by `GET /api/user/me`.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub jira_token: Option<String>,
    #[serde(default)]
    pub jira_url: Option<String>,
    #[serde(default)]
    pub jira_version: ServerType,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("jira_url", &self.jira_url)
            .field("jira_version", &self.jira_version)
            .finish_non_exhaustive()
    }
}

/// Body of `PUT /api/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerCredentialsUpdate {
    pub jira_token: String,
    pub jira_url: String,
    pub jira_version: ServerType,
}

/// A stored AI provider credential record.
#[derive(Clone, Deserialize)]
pub struct AiConfiguration {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub provider: AiProvider,
    #[serde(default)]
    pub token: String,
}

impl fmt::Debug for AiConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfiguration")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/ia-user-configuration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiConfigurationUpdate {
    #[serde(rename = "type")]
    pub provider: AiProvider,
    pub token: String,
}
