//! User profile and credential endpoints.

use reqwest::Method;
use tracing::{debug, info, instrument};

use super::client::BackendClient;
use super::error::Result;
use super::types::{
    AiConfiguration, AiConfigurationUpdate, TrackerCredentialsUpdate, User,
};

impl BackendClient {
    /// Get the signed-in user.
    ///
    /// Calls `GET /api/user/me`.
    #[instrument(skip(self))]
    pub async fn get_user(&self) -> Result<User> {
        let user: User = self.get("/api/user/me").await?;
        debug!(user_id = user.id, "Fetched current user");
        Ok(user)
    }

    /// Update the issue-tracker token, URL and server type.
    ///
    /// Calls `PUT /api/user` and returns the updated user.
    #[instrument(skip_all, fields(server_type = ?update.jira_version))]
    pub async fn update_tracker_credentials(
        &self,
        update: &TrackerCredentialsUpdate,
    ) -> Result<User> {
        let user: User = self.send_json(Method::PUT, "/api/user", update).await?;
        info!("Updated issue tracker credentials");
        Ok(user)
    }

    /// Get the stored AI provider credentials.
    ///
    /// Calls `GET /api/ia-user-configuration`.
    #[instrument(skip(self))]
    pub async fn get_ai_configurations(&self) -> Result<Vec<AiConfiguration>> {
        let configs: Vec<AiConfiguration> = self.get("/api/ia-user-configuration").await?;
        debug!("Fetched {} AI configurations", configs.len());
        Ok(configs)
    }

    /// Create or replace the credential for one AI provider.
    ///
    /// Calls `POST /api/ia-user-configuration`.
    #[instrument(skip_all, fields(provider = %update.provider))]
    pub async fn update_ai_configuration(
        &self,
        update: &AiConfigurationUpdate,
    ) -> Result<AiConfiguration> {
        let config: AiConfiguration = self
            .send_json(Method::POST, "/api/ia-user-configuration", update)
            .await?;
        info!("Updated AI configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{AiProvider, ServerType};
    use crate::api::ApiError;

    fn anonymous() -> BackendClient {
        BackendClient::new("http://127.0.0.1:9", None).unwrap()
    }

    #[tokio::test]
    async fn test_get_user_without_token() {
        let err = anonymous().get_user().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_update_tracker_credentials_without_token() {
        let update = TrackerCredentialsUpdate {
            jira_token: "t".into(),
            jira_url: "https://x.atlassian.net".into(),
            jira_version: ServerType::Cloud,
        };
        let err = anonymous().update_tracker_credentials(&update).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn test_update_ai_configuration_without_token() {
        let update = AiConfigurationUpdate {
            provider: AiProvider::Gemini,
            token: "k".into(),
        };
        let err = anonymous().update_ai_configuration(&update).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }
}
