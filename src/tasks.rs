//! Backend calls off the UI thread.
//!
//! Every screen action that needs the backend becomes one tokio task. The task
//! reports back with exactly one [`ApiMessage`] on an unbounded channel, which
//! the main loop drains after each event. Results are applied in arrival
//! order; nothing is cancelled or deduplicated here, the screens' pending
//! guards keep a second request from starting.

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{
    AiConfiguration, AiConfigurationUpdate, AiOption, AiProvider, Issue, LoginResponse, TaskGroup,
    TestCase, TestType, TrackerCredentialsUpdate, User,
};
use crate::api::{ApiError, BackendClient};
use crate::validation::DocumentFile;

/// User profile and AI credentials fetched when settings open.
#[derive(Debug)]
pub struct SettingsSnapshot {
    pub user: User,
    pub ai_configurations: Vec<AiConfiguration>,
}

/// Generation of the screen state a request was made for.
///
/// The app bumps a screen's epoch whenever it throws that screen's state away
/// (leaving the route, logging out). Results tagged with an older epoch are
/// dropped instead of landing in the fresh state.
pub type Epoch = u64;

/// The outcome of one background call.
#[derive(Debug)]
pub enum ApiMessage {
    /// Login result.
    LoggedIn(Result<LoginResponse, ApiError>),

    /// Issue lookup result.
    IssueFetched {
        epoch: Epoch,
        key: String,
        result: Result<Issue, ApiError>,
    },

    /// Generated test cases.
    TestCasesGenerated {
        epoch: Epoch,
        result: Result<Vec<TestCase>, ApiError>,
    },

    /// Test case submission result with the number of cases sent.
    TestCasesSubmitted {
        epoch: Epoch,
        key: String,
        result: Result<usize, ApiError>,
    },

    /// Task groups generated from an uploaded document.
    TasksGenerated {
        epoch: Epoch,
        result: Result<Vec<TaskGroup>, ApiError>,
    },

    /// Task group submission result with the number of groups sent.
    TaskGroupsSubmitted {
        epoch: Epoch,
        project_key: String,
        result: Result<usize, ApiError>,
    },

    /// AI providers offered by the backend.
    AiProvidersFetched {
        epoch: Epoch,
        result: Result<Vec<AiOption>, ApiError>,
    },

    /// Settings data fetched.
    SettingsLoaded {
        epoch: Epoch,
        result: Result<SettingsSnapshot, ApiError>,
    },

    /// Settings saved.
    SettingsSaved {
        epoch: Epoch,
        result: Result<(), ApiError>,
    },
}

/// Starts backend calls and routes their results to the event loop.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    fn send(tx: &mpsc::UnboundedSender<ApiMessage>, message: ApiMessage) {
        if tx.send(message).is_err() {
            debug!("Event loop gone, dropping API result");
        }
    }

    /// Spawn a login.
    pub fn spawn_login(&self, client: &BackendClient, google_token: String) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.login(&google_token).await;
            Self::send(&tx, ApiMessage::LoggedIn(result));
        });
    }

    /// Spawn an issue lookup.
    pub fn spawn_fetch_issue(&self, client: &BackendClient, epoch: Epoch, key: String) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.get_issue(&key).await;
            Self::send(&tx, ApiMessage::IssueFetched { epoch, key, result });
        });
    }

    /// Spawn test case generation.
    pub fn spawn_generate_test_cases(
        &self,
        client: &BackendClient,
        epoch: Epoch,
        key: String,
        test_type: TestType,
        provider: AiProvider,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.generate_test_cases(&key, test_type, provider).await;
            Self::send(&tx, ApiMessage::TestCasesGenerated { epoch, result });
        });
    }

    /// Spawn test case submission.
    pub fn spawn_submit_test_cases(
        &self,
        client: &BackendClient,
        epoch: Epoch,
        key: String,
        cases: Vec<TestCase>,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let count = cases.len();
            let result = client.post_test_cases(&key, &cases).await.map(|_| count);
            Self::send(&tx, ApiMessage::TestCasesSubmitted { epoch, key, result });
        });
    }

    /// Spawn a document upload for task generation.
    pub fn spawn_generate_tasks(&self, client: &BackendClient, epoch: Epoch, document: DocumentFile) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.generate_tasks(&document).await;
            Self::send(&tx, ApiMessage::TasksGenerated { epoch, result });
        });
    }

    /// Spawn task group submission.
    pub fn spawn_submit_task_groups(
        &self,
        client: &BackendClient,
        epoch: Epoch,
        project_key: String,
        groups: Vec<TaskGroup>,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let count = groups.len();
            let result = client
                .post_task_groups(&project_key, &groups)
                .await
                .map(|_| count);
            Self::send(
                &tx,
                ApiMessage::TaskGroupsSubmitted {
                    epoch,
                    project_key,
                    result,
                },
            );
        });
    }

    /// Spawn a fetch of the AI provider list.
    pub fn spawn_fetch_ai_providers(&self, client: &BackendClient, epoch: Epoch) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.list_ai_providers().await;
            Self::send(&tx, ApiMessage::AiProvidersFetched { epoch, result });
        });
    }

    /// Spawn the settings fetch: user profile, then AI credentials.
    pub fn spawn_load_settings(&self, client: &BackendClient, epoch: Epoch) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = async {
                let user = client.get_user().await?;
                let ai_configurations = client.get_ai_configurations().await?;
                Ok::<_, ApiError>(SettingsSnapshot {
                    user,
                    ai_configurations,
                })
            }
            .await;
            Self::send(&tx, ApiMessage::SettingsLoaded { epoch, result });
        });
    }

    /// Spawn the settings save: one tracker update, then one update per
    /// AI provider record, stopping at the first failure.
    pub fn spawn_save_settings(
        &self,
        client: &BackendClient,
        epoch: Epoch,
        tracker: TrackerCredentialsUpdate,
        ai_updates: Vec<AiConfigurationUpdate>,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = async {
                client.update_tracker_credentials(&tracker).await?;
                for update in &ai_updates {
                    client.update_ai_configuration(update).await?;
                }
                Ok::<(), ApiError>(())
            }
            .await;
            Self::send(&tx, ApiMessage::SettingsSaved { epoch, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn anonymous() -> BackendClient {
        BackendClient::new("http://127.0.0.1:9", None).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_issue_reports_through_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let spawner = TaskSpawner::new(tx);

        spawner.spawn_fetch_issue(&anonymous(), 3, "PIA-30".into());

        match rx.recv().await {
            Some(ApiMessage::IssueFetched { epoch, key, result }) => {
                assert_eq!(epoch, 3);
                assert_eq!(key, "PIA-30");
                assert!(matches!(result, Err(ApiError::MissingToken)));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_settings_stops_at_first_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let spawner = TaskSpawner::new(tx);

        spawner.spawn_save_settings(
            &anonymous(),
            0,
            TrackerCredentialsUpdate {
                jira_token: String::new(),
                jira_url: String::new(),
                jira_version: Default::default(),
            },
            vec![AiConfigurationUpdate {
                provider: AiProvider::Gemini,
                token: "k".into(),
            }],
        );

        assert!(matches!(
            rx.recv().await,
            Some(ApiMessage::SettingsSaved {
                result: Err(ApiError::MissingToken),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_submit_reports_empty_payload() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let spawner = TaskSpawner::new(tx);
        let client =
            BackendClient::new("http://127.0.0.1:9", Some(Session::new("t", ""))).unwrap();

        spawner.spawn_submit_task_groups(&client, 0, "PIA".into(), Vec::new());

        match rx.recv().await {
            Some(ApiMessage::TaskGroupsSubmitted {
                project_key,
                result,
                ..
            }) => {
                assert_eq!(project_key, "PIA");
                assert!(matches!(result, Err(ApiError::EmptyPayload(_))));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
