//! Routing and top-level state.
//!
//! Screens turn key presses into actions and the app turns actions into
//! background tasks. Task results come back through
//! [`App::handle_api_message`].

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::api::BackendClient;
use crate::config::{Config, Settings};
use crate::error::AppError;
use crate::events::{Event, KeyContext};
use crate::session::Session;
use crate::tasks::{ApiMessage, Epoch, TaskSpawner};
use crate::ui::theme::theme;
use crate::ui::{
    render_context_help, Banners, ErrorDialog, LoginAction, LoginView, Operation,
    SettingsAction, SettingsView, TaskAction, TaskGeneratorView, TestCaseAction, TestCaseView,
};

/// Shown after looking up an epic.
const EPIC_WARNING: &str =
    "This issue is an epic. Consider splitting it into smaller stories first.";

/// A screen of the application, addressed by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    TestCaseGenerator,
    TaskGenerator,
}

impl Route {
    /// Resolve a path. Unknown paths go to the login screen.
    pub fn parse(path: &str) -> Self {
        match path.trim().trim_end_matches('/') {
            "/test-case-generator" | "test-case-generator" => Route::TestCaseGenerator,
            "/task-generator" | "task-generator" => Route::TaskGenerator,
            _ => Route::Login,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::TestCaseGenerator => "/test-case-generator",
            Route::TaskGenerator => "/task-generator",
        }
    }

    /// Whether the route is reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login)
    }

    /// The route actually shown: protected routes redirect to login without
    /// a session.
    pub fn guard(self, authenticated: bool) -> Self {
        if self.is_public() || authenticated {
            self
        } else {
            Route::Login
        }
    }

    /// Tab title in the header.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::TestCaseGenerator => "Test Case Generator",
            Route::TaskGenerator => "Task Generator",
        }
    }
}

/// The generator screens, in tab order.
const TABS: [Route; 2] = [Route::TestCaseGenerator, Route::TaskGenerator];

/// Everything the TUI knows: the current route, the session-bearing client
/// and one state object per screen.
///
/// Screen state lives only while its route is shown. Leaving a generator
/// route or logging out replaces the screen with a fresh one and bumps its
/// epoch, so results still in flight for the old state are dropped.
pub struct App {
    route: Route,
    should_quit: bool,
    client: BackendClient,
    spawner: TaskSpawner,
    defaults: Settings,
    login: LoginView,
    test_cases: TestCaseView,
    test_cases_epoch: Epoch,
    tasks: TaskGeneratorView,
    tasks_epoch: Epoch,
    settings: SettingsView,
    settings_epoch: Epoch,
    banners: Banners,
    /// Error dialog for critical errors.
    error_dialog: ErrorDialog,
}

impl App {
    /// Create the application and enter `start`, subject to the route guard.
    pub fn new(config: &Config, client: BackendClient, spawner: TaskSpawner, start: Route) -> Self {
        let defaults = config.settings.clone();
        let mut app = Self {
            route: Route::Login,
            should_quit: false,
            client,
            spawner,
            login: LoginView::new(),
            test_cases: fresh_test_cases(&defaults),
            test_cases_epoch: 0,
            tasks: fresh_tasks(&defaults),
            tasks_epoch: 0,
            settings: SettingsView::new(),
            settings_epoch: 0,
            banners: Banners::with_lifetime(Duration::from_secs(defaults.banner_seconds)),
            error_dialog: ErrorDialog::new(),
            defaults,
        };
        app.navigate(start);
        app
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Returns whether the application should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(test)]
    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    #[cfg(test)]
    pub fn banners(&self) -> &Banners {
        &self.banners
    }

    /// Go to a route, applying the session guard.
    pub fn navigate(&mut self, target: Route) {
        let route = target.guard(self.client.is_authenticated());
        if route != target {
            debug!(requested = target.path(), "No session, redirecting to login");
        }
        if route == self.route && route != Route::Login {
            return;
        }
        info!(route = route.path(), "Navigating");
        match self.route {
            Route::TestCaseGenerator if route != Route::TestCaseGenerator => self.reset_test_cases(),
            Route::TaskGenerator if route != Route::TaskGenerator => self.reset_tasks(),
            _ => {}
        }
        self.route = route;
        if route == Route::TestCaseGenerator {
            self.spawner
                .spawn_fetch_ai_providers(&self.client, self.test_cases_epoch);
        }
    }

    fn reset_test_cases(&mut self) {
        self.test_cases_epoch += 1;
        self.test_cases = fresh_test_cases(&self.defaults);
    }

    fn reset_tasks(&mut self) {
        self.tasks_epoch += 1;
        self.tasks = fresh_tasks(&self.defaults);
    }

    fn reset_settings(&mut self) {
        self.settings_epoch += 1;
        self.settings = SettingsView::new();
    }

    /// Handle an application error.
    ///
    /// Critical errors are shown in a modal dialog, everything else as a
    /// banner. Errors that invalidate the session send the user to login.
    pub fn handle_error(&mut self, error: &AppError) {
        if error.is_critical() {
            warn!(error = %error, "Showing error dialog");
            self.error_dialog.show(error);
            return;
        }
        debug!(error = %error, "Showing error banner");
        self.banners.error(error.user_message());
        if error.requires_login() && self.route != Route::Login {
            self.client.set_session(None);
            self.reset_settings();
            self.navigate(Route::Login);
        }
    }

    /// Drop the session, both in memory and in the keyring.
    pub fn logout(&mut self) {
        info!("Logging out");
        if let Err(e) = Session::clear() {
            self.handle_error(&e.into());
        }
        self.client.set_session(None);
        self.reset_settings();
        self.navigate(Route::Login);
        self.reset_test_cases();
        self.reset_tasks();
        self.banners.info("Signed out");
    }

    /// Apply one terminal event.
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("Quit requested");
                self.should_quit = true;
            }
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key_event(key);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => {
                self.banners.tick();
                self.test_cases.tick();
                self.tasks.tick();
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.error_dialog.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_dialog.dismiss();
            }
            return;
        }

        if self.settings.is_visible() {
            if let Some(action) = self.settings.handle_input(key) {
                self.handle_settings_action(action);
            }
            return;
        }

        if self.route == Route::Login {
            if let Some(action) = self.login.handle_input(key) {
                match action {
                    LoginAction::Submit(token) => self.spawner.spawn_login(&self.client, token),
                    LoginAction::Quit => self.should_quit = true,
                }
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => {
                    let next = match self.route {
                        Route::TestCaseGenerator => Route::TaskGenerator,
                        _ => Route::TestCaseGenerator,
                    };
                    self.navigate(next);
                    return;
                }
                KeyCode::Char('s') => {
                    if self.settings.open() {
                        self.spawner
                            .spawn_load_settings(&self.client, self.settings_epoch);
                    }
                    return;
                }
                KeyCode::Char('o') => {
                    self.logout();
                    return;
                }
                _ => {}
            }
        }

        let capturing = match self.route {
            Route::TestCaseGenerator => self.test_cases.is_capturing_text(),
            Route::TaskGenerator => self.tasks.is_capturing_text(),
            Route::Login => true,
        };
        if key.code == KeyCode::Char('q') && key.modifiers == KeyModifiers::NONE && !capturing {
            self.should_quit = true;
            return;
        }

        match self.route {
            Route::TestCaseGenerator => {
                if let Some(action) = self.test_cases.handle_input(key) {
                    self.handle_test_case_action(action);
                }
            }
            Route::TaskGenerator => {
                if let Some(action) = self.tasks.handle_input(key) {
                    self.handle_task_action(action);
                }
            }
            Route::Login => {}
        }
    }

    fn handle_test_case_action(&mut self, action: TestCaseAction) {
        match action {
            TestCaseAction::FetchIssue(key) => {
                debug!(issue_key = %key, "Looking up issue");
                self.spawner
                    .spawn_fetch_issue(&self.client, self.test_cases_epoch, key);
            }
            TestCaseAction::Generate {
                key,
                test_type,
                provider,
            } => {
                self.spawner.spawn_generate_test_cases(
                    &self.client,
                    self.test_cases_epoch,
                    key,
                    test_type,
                    provider,
                );
            }
            TestCaseAction::Submit { key, cases } => {
                self.spawner
                    .spawn_submit_test_cases(&self.client, self.test_cases_epoch, key, cases);
            }
            TestCaseAction::RefreshProviders => {
                self.spawner
                    .spawn_fetch_ai_providers(&self.client, self.test_cases_epoch);
            }
            TestCaseAction::Rejected(error) => self.handle_error(&error),
        }
    }

    fn handle_task_action(&mut self, action: TaskAction) {
        match action {
            TaskAction::Upload(document) => {
                debug!(file = %document.name, "Uploading document");
                self.spawner
                    .spawn_generate_tasks(&self.client, self.tasks_epoch, document);
            }
            TaskAction::Submit {
                project_key,
                groups,
            } => {
                self.spawner.spawn_submit_task_groups(
                    &self.client,
                    self.tasks_epoch,
                    project_key,
                    groups,
                );
            }
            TaskAction::Rejected(error) => self.handle_error(&error),
        }
    }

    fn handle_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::Save {
                tracker,
                ai_updates,
            } => self.spawner.spawn_save_settings(
                &self.client,
                self.settings_epoch,
                tracker,
                ai_updates,
            ),
            SettingsAction::Close => debug!("Settings closed"),
        }
    }

    /// Apply the result of a background task.
    ///
    /// Results for screen state that has been reset since the request was
    /// made are dropped. Submissions are the exception: they changed the
    /// issue tracker, so their outcome is still reported.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::LoggedIn(Ok(tokens)) => {
                let session = Session::from(tokens);
                if let Err(e) = session.store() {
                    warn!("Failed to persist session: {}", e);
                    self.handle_error(&e.into());
                }
                self.client.set_session(Some(session));
                self.login.finish(true);
                self.navigate(Route::TaskGenerator);
                self.banners.success("Signed in");
            }
            ApiMessage::LoggedIn(Err(e)) => {
                self.login.finish(false);
                self.handle_error(&e.into());
            }
            ApiMessage::IssueFetched { epoch, key, result } => {
                if self.is_stale(epoch, self.test_cases_epoch, "issue lookup") {
                    return;
                }
                match result {
                    Ok(issue) => {
                        if self.test_cases.set_issue(key, issue) {
                            self.banners.warning(EPIC_WARNING);
                        }
                    }
                    Err(e) => {
                        self.test_cases.finish(Operation::Lookup);
                        self.handle_error(&e.into());
                    }
                }
            }
            ApiMessage::TestCasesGenerated { epoch, result } => {
                if self.is_stale(epoch, self.test_cases_epoch, "test case generation") {
                    return;
                }
                match result {
                    Ok(cases) => {
                        let count = cases.len();
                        self.test_cases.set_test_cases(cases);
                        self.banners
                            .success(format!("Generated {} test cases", count));
                    }
                    Err(e) => {
                        self.test_cases.finish(Operation::Generate);
                        self.handle_error(&e.into());
                    }
                }
            }
            ApiMessage::TestCasesSubmitted { epoch, key, result } => {
                if epoch == self.test_cases_epoch {
                    self.test_cases.finish(Operation::Submit);
                }
                match result {
                    Ok(count) => self
                        .banners
                        .success(format!("Sent {} test cases to {}", count, key)),
                    Err(e) => self.handle_error(&e.into()),
                }
            }
            ApiMessage::TasksGenerated { epoch, result } => {
                if self.is_stale(epoch, self.tasks_epoch, "task generation") {
                    return;
                }
                match result {
                    Ok(groups) => {
                        let count = groups.len();
                        self.tasks.set_task_groups(groups);
                        self.banners
                            .success(format!("Generated {} epics", count));
                    }
                    Err(e) => {
                        self.tasks.finish(Operation::Upload);
                        self.handle_error(&e.into());
                    }
                }
            }
            ApiMessage::TaskGroupsSubmitted {
                epoch,
                project_key,
                result,
            } => {
                if epoch == self.tasks_epoch {
                    self.tasks.finish(Operation::Submit);
                }
                match result {
                    Ok(count) => self
                        .banners
                        .success(format!("Sent {} epics to {}", count, project_key)),
                    Err(e) => self.handle_error(&e.into()),
                }
            }
            ApiMessage::AiProvidersFetched { epoch, result } => {
                if self.is_stale(epoch, self.test_cases_epoch, "provider list") {
                    return;
                }
                match result {
                    Ok(options) => self.test_cases.set_providers(options),
                    Err(e) => {
                        self.test_cases.finish(Operation::Providers);
                        self.handle_error(&e.into());
                    }
                }
            }
            ApiMessage::SettingsLoaded { epoch, result } => {
                if self.is_stale(epoch, self.settings_epoch, "settings load") {
                    return;
                }
                match result {
                    Ok(snapshot) => self.settings.seed(snapshot),
                    Err(e) => {
                        self.settings.load_failed();
                        self.handle_error(&e.into());
                    }
                }
            }
            ApiMessage::SettingsSaved { epoch, result } => {
                if self.is_stale(epoch, self.settings_epoch, "settings save") {
                    return;
                }
                match result {
                    Ok(()) => {
                        self.settings.finish_save(true);
                        self.banners.success("Settings saved");
                    }
                    Err(e) => {
                        self.settings.finish_save(false);
                        self.handle_error(&e.into());
                    }
                }
            }
        }
    }

    fn is_stale(&self, epoch: Epoch, current: Epoch, what: &str) -> bool {
        let stale = epoch != current;
        if stale {
            debug!(epoch, current, "Dropping {} result for a reset screen", what);
        }
        stale
    }

    /// Draw the current route with the overlays on top.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if self.route == Route::Login {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(area);
            self.login.render(frame, chunks[0]);
            render_context_help(frame, chunks[1], &[KeyContext::Login]);
        } else {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(area);

            self.render_header(frame, chunks[0]);
            let context = match self.route {
                Route::TestCaseGenerator => {
                    self.test_cases.render(frame, chunks[1]);
                    self.test_cases.context()
                }
                _ => {
                    self.tasks.render(frame, chunks[1]);
                    self.tasks.context()
                }
            };
            let contexts = if self.settings.is_visible() {
                vec![KeyContext::Settings]
            } else if context == KeyContext::Editing {
                vec![KeyContext::Editing]
            } else {
                vec![context, KeyContext::Global]
            };
            render_context_help(frame, chunks[2], &contexts);
            self.settings.render(frame, area);
        }

        self.banners.render(frame, area);
        self.error_dialog.render(frame, area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let titles: Vec<Line> = TABS.iter().map(|r| Line::from(r.title())).collect();
        let selected = TABS.iter().position(|r| *r == self.route).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(t.border(false))
                    .title(Span::styled(" Jira Test Generator ", t.title()))
                    .title_bottom(Line::from(" Ctrl+S settings ").right_aligned()),
            )
            .select(selected)
            .style(Style::default().fg(t.muted))
            .highlight_style(Style::default().fg(t.accent).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }
}

fn fresh_test_cases(defaults: &Settings) -> TestCaseView {
    TestCaseView::new(defaults.default_test_type, defaults.default_ai_provider)
}

fn fresh_tasks(defaults: &Settings) -> TaskGeneratorView {
    TaskGeneratorView::new(defaults.default_project_key.as_deref())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tokio::sync::mpsc;

    use super::*;
    use crate::api::types::{Issue, LoginResponse, TaskGroup, TestCase};
    use crate::api::ApiError;
    use crate::session::SessionError;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn app(session: Option<Session>, start: Route) -> (App, mpsc::UnboundedReceiver<ApiMessage>) {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let (tx, rx) = mpsc::unbounded_channel();
        let client = BackendClient::new("http://127.0.0.1:9", session).unwrap();
        let app = App::new(&Config::default(), client, TaskSpawner::new(tx), start);
        (app, rx)
    }

    fn signed_in(start: Route) -> (App, mpsc::UnboundedReceiver<ApiMessage>) {
        app(Some(Session::new("access", "refresh")), start)
    }

    fn issue(issue_type: &str) -> Issue {
        Issue {
            title: "Checkout".into(),
            description: None,
            assignee: String::new(),
            status: "To Do".into(),
            issue_type: issue_type.into(),
        }
    }

    fn messages(app: &App) -> Vec<String> {
        app.banners().iter().map(|b| b.text.clone()).collect()
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/test-case-generator"), Route::TestCaseGenerator);
        assert_eq!(Route::parse("/task-generator/"), Route::TaskGenerator);
        assert_eq!(Route::parse("/nowhere"), Route::Login);
        assert_eq!(Route::parse(""), Route::Login);
    }

    #[test]
    fn test_route_guard() {
        assert_eq!(Route::TaskGenerator.guard(false), Route::Login);
        assert_eq!(Route::TaskGenerator.guard(true), Route::TaskGenerator);
        assert_eq!(Route::Login.guard(false), Route::Login);
        assert_eq!(Route::Login.guard(true), Route::Login);
    }

    #[test]
    fn test_route_path_round_trip() {
        for route in [Route::Login, Route::TestCaseGenerator, Route::TaskGenerator] {
            assert_eq!(Route::parse(route.path()), route);
        }
    }

    #[tokio::test]
    async fn test_protected_start_redirects_without_session() {
        let (app, _rx) = app(None, Route::TestCaseGenerator);
        assert_eq!(app.route(), Route::Login);
    }

    #[tokio::test]
    async fn test_start_route_with_session() {
        let (app, _rx) = signed_in(Route::TaskGenerator);
        assert_eq!(app.route(), Route::TaskGenerator);
    }

    #[tokio::test]
    async fn test_entering_test_cases_fetches_providers() {
        let (_app, mut rx) = signed_in(Route::TestCaseGenerator);
        assert!(matches!(
            rx.recv().await,
            Some(ApiMessage::AiProvidersFetched { epoch: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_ctrl_n_switches_generator() {
        let (mut app, _rx) = signed_in(Route::TaskGenerator);
        app.update(ctrl('n'));
        assert_eq!(app.route(), Route::TestCaseGenerator);
        app.update(ctrl('n'));
        assert_eq!(app.route(), Route::TaskGenerator);
    }

    #[tokio::test]
    async fn test_q_does_not_quit_while_typing() {
        let (mut app, _rx) = signed_in(Route::TaskGenerator);
        app.update(key(KeyCode::Char('q')));
        assert!(!app.should_quit());

        app.update(key(KeyCode::Esc));
        app.update(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_quit_event_from_login() {
        let (mut app, _rx) = app(None, Route::Login);
        app.update(Event::Quit);
        assert!(app.should_quit());
    }

    #[tokio::test]
    #[serial]
    async fn test_login_success_navigates_to_task_generator() {
        let (mut app, _rx) = app(None, Route::Login);
        app.handle_api_message(ApiMessage::LoggedIn(Ok(LoginResponse {
            access_token: "aaa".into(),
            refresh_token: "bbb".into(),
        })));
        assert!(app.is_authenticated());
        assert_eq!(app.route(), Route::TaskGenerator);
    }

    #[tokio::test]
    async fn test_login_failure_stays_on_login() {
        let (mut app, _rx) = app(None, Route::Login);
        app.handle_api_message(ApiMessage::LoggedIn(Err(ApiError::Server {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: "Invalid Google token".into(),
        })));
        assert_eq!(app.route(), Route::Login);
        assert_eq!(messages(&app), vec!["Invalid Google token".to_string()]);
    }

    #[tokio::test]
    async fn test_epic_lookup_warns() {
        let (mut app, _rx) = signed_in(Route::TestCaseGenerator);
        app.handle_api_message(ApiMessage::IssueFetched {
            epoch: 0,
            key: "PIA-1".into(),
            result: Ok(issue("Epic")),
        });
        assert_eq!(messages(&app), vec![EPIC_WARNING.to_string()]);

        let (mut app, _rx) = signed_in(Route::TestCaseGenerator);
        app.handle_api_message(ApiMessage::IssueFetched {
            epoch: 0,
            key: "PIA-2".into(),
            result: Ok(issue("Story")),
        });
        assert!(app.banners().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_sends_user_to_login() {
        let (mut app, _rx) = signed_in(Route::TestCaseGenerator);
        app.handle_api_message(ApiMessage::IssueFetched {
            epoch: 0,
            key: "PIA-1".into(),
            result: Err(ApiError::MissingToken),
        });
        assert_eq!(app.route(), Route::Login);
        assert!(!app.is_authenticated());
        assert_eq!(
            messages(&app),
            vec!["You are not signed in. Please log in again.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_rejected_key_is_a_banner() {
        let (mut app, mut rx) = signed_in(Route::TestCaseGenerator);
        let _ = rx.recv().await;
        app.update(key(KeyCode::Char('x')));
        app.update(key(KeyCode::Enter));
        assert_eq!(messages(&app).len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_settings_open_loads_once() {
        let (mut app, mut rx) = signed_in(Route::TaskGenerator);
        app.update(ctrl('s'));
        app.update(ctrl('s'));
        assert!(matches!(
            rx.recv().await,
            Some(ApiMessage::SettingsLoaded { .. })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_logout_returns_to_login() {
        let (mut app, _rx) = signed_in(Route::TaskGenerator);
        app.update(ctrl('o'));
        assert_eq!(app.route(), Route::Login);
        assert!(!app.is_authenticated());

        app.update(ctrl('n'));
        assert_eq!(app.route(), Route::Login);
    }

    fn looked_up_with_cases(app: &mut App) {
        let epoch = app.test_cases_epoch;
        app.handle_api_message(ApiMessage::IssueFetched {
            epoch,
            key: "PIA-1".into(),
            result: Ok(issue("Story")),
        });
        app.handle_api_message(ApiMessage::TestCasesGenerated {
            epoch,
            result: Ok(vec![TestCase {
                title: "Pay by card".into(),
                description: "steps".into(),
                result: "paid".into(),
            }]),
        });
        assert_eq!(app.test_cases.issue_key(), Some("PIA-1"));
        assert_eq!(app.test_cases.cases().len(), 1);
    }

    #[tokio::test]
    async fn test_leaving_test_cases_discards_issue_and_cases() {
        let (mut app, _rx) = signed_in(Route::TestCaseGenerator);
        looked_up_with_cases(&mut app);

        app.update(ctrl('n'));
        app.update(ctrl('n'));
        assert_eq!(app.route(), Route::TestCaseGenerator);
        assert!(app.test_cases.issue().is_none());
        assert!(app.test_cases.cases().is_empty());
    }

    #[tokio::test]
    async fn test_result_for_left_screen_is_dropped() {
        let (mut app, _rx) = signed_in(Route::TestCaseGenerator);
        let old = app.test_cases_epoch;
        app.update(ctrl('n'));
        app.update(ctrl('n'));

        app.handle_api_message(ApiMessage::IssueFetched {
            epoch: old,
            key: "PIA-1".into(),
            result: Ok(issue("Epic")),
        });
        assert!(app.test_cases.issue().is_none());
        assert!(app.banners().is_empty());
    }

    #[tokio::test]
    async fn test_stale_upload_result_is_dropped() {
        let (mut app, _rx) = signed_in(Route::TaskGenerator);
        let old = app.tasks_epoch;
        app.update(ctrl('n'));

        app.handle_api_message(ApiMessage::TasksGenerated {
            epoch: old,
            result: Ok(vec![TaskGroup::default()]),
        });
        app.update(ctrl('n'));
        assert!(app.tasks.groups().is_empty());
    }

    #[tokio::test]
    async fn test_stale_submission_is_still_reported() {
        let (mut app, _rx) = signed_in(Route::TaskGenerator);
        let old = app.tasks_epoch;
        app.update(ctrl('n'));

        app.handle_api_message(ApiMessage::TaskGroupsSubmitted {
            epoch: old,
            project_key: "PIA".into(),
            result: Ok(2),
        });
        assert_eq!(messages(&app), vec!["Sent 2 epics to PIA".to_string()]);
    }

    #[tokio::test]
    #[serial]
    async fn test_relogin_starts_from_empty_screens() {
        let (mut app, _rx) = signed_in(Route::TestCaseGenerator);
        looked_up_with_cases(&mut app);
        let old = app.test_cases_epoch;

        app.update(ctrl('o'));
        app.handle_api_message(ApiMessage::LoggedIn(Ok(LoginResponse {
            access_token: "other".into(),
            refresh_token: String::new(),
        })));
        app.navigate(Route::TestCaseGenerator);
        assert!(app.test_cases.issue().is_none());
        assert!(app.test_cases.cases().is_empty());

        app.handle_api_message(ApiMessage::TestCasesGenerated {
            epoch: old,
            result: Ok(vec![TestCase::default()]),
        });
        assert!(app.test_cases.cases().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_settings_from_previous_session_are_dropped() {
        let (mut app, _rx) = signed_in(Route::TaskGenerator);
        app.update(ctrl('s'));
        assert!(app.settings.is_visible());
        let old = app.settings_epoch;
        app.logout();

        app.handle_api_message(ApiMessage::SettingsSaved {
            epoch: old,
            result: Ok(()),
        });
        assert!(!app.settings.is_visible());
        assert!(!messages(&app).contains(&"Settings saved".to_string()));
    }

    #[tokio::test]
    async fn test_error_dialog_blocks_input() {
        let (mut app, _rx) = signed_in(Route::TaskGenerator);
        app.handle_error(&SessionError::Keyring("locked".into()).into());
        app.update(ctrl('n'));
        assert_eq!(app.route(), Route::TaskGenerator);
        app.update(key(KeyCode::Enter));
        app.update(ctrl('n'));
        assert_eq!(app.route(), Route::TestCaseGenerator);
    }
}
