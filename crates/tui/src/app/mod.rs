use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use api_types::{analysis::AnalysisResult, history::AnalysisRecord, news::Article};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEventKind};
use engine::Thresholds;
use services::{
    AnalysisApi, AnalysisSessionStore, DocumentStore, FirebaseIdentity, Firestore, Identity,
    MemoryIdentity, MemoryStore, PersistEvent, User,
};
use tokio::sync::{mpsc, watch};

use crate::{
    config::{AppConfig, Backend},
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

mod dashboard;
mod login;

pub use dashboard::{DashboardFocus, DashboardState};
pub use login::{AuthMode, LoginField, LoginState};

const TOAST_TTL: Duration = Duration::from_secs(3);
const DIAGNOSTICS_CAP: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Dashboard,
    History,
}

impl Page {
    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home / News",
            Self::Login => "Login / Register",
            Self::Dashboard => "Dashboard",
            Self::History => "History",
        }
    }

    pub fn requires_session(self) -> bool {
        matches!(self, Self::Dashboard | Self::History)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

#[derive(Debug, Default)]
pub struct HomeState {
    pub articles: Vec<Article>,
    pub loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
    pub selected: usize,
}

#[derive(Debug, Default)]
pub struct HistoryState {
    pub records: Vec<AnalysisRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
}

/// State transitions. Everything the UI reacts to arrives as one of these.
#[derive(Debug)]
pub enum Message {
    SessionChanged(Option<User>),
    Navigate(Page),
    NewsLoaded(std::result::Result<Vec<Article>, String>),
    AuthFinished(std::result::Result<(), String>),
    UploadFinished(std::result::Result<AnalysisResult, String>),
    HistoryLoaded(std::result::Result<Vec<AnalysisRecord>, String>),
    OpenRecord(usize),
    Persisted(PersistEvent),
}

/// Work the runtime performs on behalf of the state, answered with a
/// [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadNews,
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
    Upload(PathBuf),
    LoadHistory,
}

#[derive(Debug)]
pub struct AppState {
    pub page: Page,
    pub user: Option<User>,
    pub home: HomeState,
    pub login: LoginState,
    pub dashboard: DashboardState,
    pub history: HistoryState,
    pub toast: Option<ToastState>,
    pub diagnostics: Vec<String>,
    pub show_diagnostics: bool,
    pub tz: Tz,
    pub thresholds: Thresholds,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(tz: Tz, thresholds: Thresholds) -> Self {
        Self {
            page: Page::Home,
            user: None,
            home: HomeState::default(),
            login: LoginState::default(),
            dashboard: DashboardState::default(),
            history: HistoryState::default(),
            toast: None,
            diagnostics: Vec::new(),
            show_diagnostics: false,
            tz,
            thresholds,
            should_quit: false,
        }
    }

    /// Session-only pages fall back to Home when nobody is signed in.
    pub fn visible_page(&self) -> Page {
        if self.page.requires_session() && self.user.is_none() {
            Page::Home
        } else {
            self.page
        }
    }

    pub fn editing(&self) -> bool {
        match self.visible_page() {
            Page::Login => true,
            Page::Dashboard => self.dashboard.editing(),
            Page::Home | Page::History => false,
        }
    }

    pub fn update(&mut self, message: Message) -> Option<Effect> {
        match message {
            Message::SessionChanged(user) => self.session_changed(user),
            Message::Navigate(page) => self.navigate(page),
            Message::NewsLoaded(outcome) => {
                self.home.loading = false;
                self.home.loaded = true;
                match outcome {
                    Ok(articles) => {
                        self.home.articles = articles;
                        self.home.error = None;
                        self.home.selected = 0;
                    }
                    Err(message) => self.home.error = Some(message),
                }
                None
            }
            Message::AuthFinished(outcome) => {
                self.login.finish_submit(outcome);
                None
            }
            Message::UploadFinished(outcome) => {
                self.dashboard.finish_upload(outcome);
                None
            }
            Message::HistoryLoaded(outcome) => {
                self.history.loading = false;
                match outcome {
                    Ok(records) => {
                        self.history.records = records;
                        self.history.error = None;
                    }
                    Err(message) => {
                        self.history.records.clear();
                        self.history.error = Some(message);
                    }
                }
                self.history.selected = 0;
                None
            }
            Message::OpenRecord(index) => {
                if let Some(record) = self.history.records.get(index) {
                    self.dashboard.show(record.result.clone());
                    self.page = Page::Dashboard;
                }
                None
            }
            Message::Persisted(event) => {
                self.record_persist(event);
                None
            }
        }
    }

    fn session_changed(&mut self, user: Option<User>) -> Option<Effect> {
        let signed_in = user.is_some();
        if let Some(u) = &user {
            self.notify(format!("Signed in as {}", u.email), ToastLevel::Info);
        }
        self.user = user;

        if signed_in {
            if self.page == Page::History {
                self.navigate(Page::History)
            } else {
                self.navigate(Page::Dashboard)
            }
        } else {
            self.dashboard.clear();
            self.history = HistoryState::default();
            self.navigate(Page::Home)
        }
    }

    fn navigate(&mut self, page: Page) -> Option<Effect> {
        if page.requires_session() && self.user.is_none() {
            return self.navigate(Page::Home);
        }

        match page {
            Page::Home => {
                self.page = Page::Home;
                if self.home.loaded || self.home.loading {
                    return None;
                }
                self.home.loading = true;
                Some(Effect::LoadNews)
            }
            Page::Login => {
                if self.user.is_some() {
                    return None;
                }
                self.page = Page::Login;
                self.login.message = None;
                None
            }
            Page::Dashboard => {
                self.page = Page::Dashboard;
                if self.dashboard.result.is_none() && !self.dashboard.loading {
                    self.dashboard.focus = DashboardFocus::Path;
                }
                None
            }
            Page::History => {
                self.page = Page::History;
                self.history.loading = true;
                self.history.error = None;
                Some(Effect::LoadHistory)
            }
        }
    }

    fn record_persist(&mut self, event: PersistEvent) {
        let line = match &event {
            PersistEvent::Saved { id, file_name } => format!("saved {file_name} as {id}"),
            PersistEvent::Skipped { file_name } => format!("not saved {file_name}: no session"),
            PersistEvent::Failed { file_name, error } => {
                format!("failed to save {file_name}: {error}")
            }
        };
        if self.diagnostics.len() == DIAGNOSTICS_CAP {
            self.diagnostics.remove(0);
        }
        self.diagnostics.push(line);

        if let PersistEvent::Saved { .. } = event {
            self.notify("Analysis saved to history".to_string(), ToastLevel::Success);
        }
    }

    pub fn notify(&mut self, message: String, level: ToastLevel) {
        self.toast = Some(ToastState {
            message,
            level,
            shown_at: Instant::now(),
        });
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| now.duration_since(t.shown_at) >= TOAST_TTL)
        {
            self.toast = None;
        }
    }

    pub fn handle_action(&mut self, action: AppAction) -> Option<Effect> {
        if action == AppAction::Quit {
            self.should_quit = true;
            return None;
        }
        if self.show_diagnostics {
            if matches!(action, AppAction::Cancel | AppAction::Input('g')) {
                self.show_diagnostics = false;
            }
            return None;
        }

        match self.visible_page() {
            Page::Login => self.handle_login(action),
            Page::Dashboard if self.dashboard.editing() => self.handle_dashboard_input(action),
            page => {
                if let AppAction::Input(ch) = action
                    && let Some(effect) = self.handle_global(ch)
                {
                    return effect;
                }
                match page {
                    Page::Home => self.handle_home(action),
                    Page::Dashboard => self.handle_dashboard(action),
                    Page::History => self.handle_history(action),
                    Page::Login => None,
                }
            }
        }
    }

    /// Navigation shortcuts. `Some` means the key was consumed.
    fn handle_global(&mut self, ch: char) -> Option<Option<Effect>> {
        let effect = match ch {
            'h' => self.navigate(Page::Home),
            'd' => self.navigate(Page::Dashboard),
            'y' => self.navigate(Page::History),
            'l' => {
                if self.user.is_some() {
                    Some(Effect::SignOut)
                } else {
                    self.navigate(Page::Login)
                }
            }
            'g' => {
                self.show_diagnostics = true;
                None
            }
            _ => return None,
        };
        Some(effect)
    }

    fn handle_login(&mut self, action: AppAction) -> Option<Effect> {
        match action {
            AppAction::Input(ch) => self.login.active_field_mut().push(ch),
            AppAction::Backspace => {
                self.login.active_field_mut().pop();
            }
            AppAction::NextField | AppAction::Up | AppAction::Down => self.login.advance_focus(),
            AppAction::ToggleMode => self.login.toggle_mode(),
            AppAction::Cancel => return self.navigate(Page::Home),
            AppAction::Submit => {
                let (email, password) = self.login.begin_submit()?;
                return Some(match self.login.mode {
                    AuthMode::SignIn => Effect::SignIn { email, password },
                    AuthMode::Register => Effect::SignUp { email, password },
                });
            }
            AppAction::Quit | AppAction::None => {}
        }
        None
    }

    fn handle_dashboard_input(&mut self, action: AppAction) -> Option<Effect> {
        let dash = &mut self.dashboard;
        match (dash.focus, action) {
            (DashboardFocus::Path, AppAction::Input(ch)) => dash.path_input.push(ch),
            (DashboardFocus::Path, AppAction::Backspace) => {
                dash.path_input.pop();
            }
            (DashboardFocus::Path, AppAction::Submit) => {
                return dash.begin_upload().map(Effect::Upload);
            }
            (DashboardFocus::Search, AppAction::Input(ch)) => dash.push_search(ch),
            (DashboardFocus::Search, AppAction::Backspace) => dash.pop_search(),
            (DashboardFocus::Search, AppAction::Up) => dash.select_prev(),
            (DashboardFocus::Search, AppAction::Down) => dash.select_next(),
            (_, AppAction::Cancel | AppAction::Submit | AppAction::NextField) => {
                dash.focus = DashboardFocus::Browse;
            }
            _ => {}
        }
        None
    }

    fn handle_dashboard(&mut self, action: AppAction) -> Option<Effect> {
        let dash = &mut self.dashboard;
        if dash.loading {
            return None;
        }
        match action {
            AppAction::Input('u') => dash.focus = DashboardFocus::Path,
            AppAction::Input('/') if dash.result.is_some() => dash.focus = DashboardFocus::Search,
            AppAction::Input('f') if dash.result.is_some() => dash.cycle_status(),
            AppAction::Up => dash.select_prev(),
            AppAction::Down => dash.select_next(),
            AppAction::Submit if dash.result.is_some() => dash.toggle_detail(),
            AppAction::Submit => dash.focus = DashboardFocus::Path,
            AppAction::Cancel => dash.detail_open = false,
            _ => {}
        }
        None
    }

    fn handle_history(&mut self, action: AppAction) -> Option<Effect> {
        match action {
            AppAction::Submit => self.update(Message::OpenRecord(self.history.selected)),
            AppAction::Input('r') if !self.history.loading => self.navigate(Page::History),
            AppAction::Up => {
                self.history.selected = self.history.selected.saturating_sub(1);
                None
            }
            AppAction::Down => {
                let last = self.history.records.len().saturating_sub(1);
                self.history.selected = (self.history.selected + 1).min(last);
                None
            }
            _ => None,
        }
    }

    fn handle_home(&mut self, action: AppAction) -> Option<Effect> {
        let home = &mut self.home;
        match action {
            AppAction::Up => home.selected = home.selected.saturating_sub(1),
            AppAction::Down if !home.articles.is_empty() => {
                home.selected = (home.selected + 1).min(home.articles.len() - 1);
            }
            AppAction::Input('r') if !home.loading => {
                home.loaded = false;
                return self.navigate(Page::Home);
            }
            _ => {}
        }
        None
    }
}

pub struct App {
    pub state: AppState,
    session: AnalysisSessionStore,
    identity: Arc<dyn Identity>,
    session_rx: watch::Receiver<Option<User>>,
    persist_rx: mpsc::UnboundedReceiver<PersistEvent>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spendscope/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let api = AnalysisApi::with_client(http.clone(), &config.analysis_url);

        let (identity, store): (Arc<dyn Identity>, Arc<dyn DocumentStore>) = match config.backend
        {
            Backend::Firebase => (
                Arc::new(
                    FirebaseIdentity::new(
                        http.clone(),
                        &config.firebase.identity_url,
                        &config.firebase.api_key,
                    )
                    .with_token_url(&config.firebase.token_url),
                ),
                Arc::new(Firestore::new(
                    http,
                    &config.firebase.firestore_url,
                    &config.firebase.project_id,
                )),
            ),
            Backend::Memory => (
                Arc::new(MemoryIdentity::new()),
                Arc::new(MemoryStore::new()),
            ),
        };
        tracing::info!(backend = ?config.backend, analysis_url = %config.analysis_url, "starting");

        let (session, persist_rx) = AnalysisSessionStore::new(api, identity.clone(), store);
        let session_rx = identity.subscribe();
        let state = AppState::new(config.tz()?, config.thresholds);

        Ok(Self {
            state,
            session,
            identity,
            session_rx,
            persist_rx,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);
        let mut pending = self.state.update(Message::Navigate(Page::Home));

        while !self.state.should_quit {
            if let Some(effect) = self.poll_background() {
                pending.get_or_insert(effect);
            }

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            // Drawn first so the loading state is visible while we wait.
            if let Some(effect) = pending.take() {
                if let Some(message) = self.run_effect(effect).await {
                    pending = self.state.update(message);
                }
                continue;
            }

            if event::poll(tick_rate)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                pending = self
                    .state
                    .handle_action(map_key(key, self.state.editing()));
            }
            self.state.expire_toast(Instant::now());
        }

        Ok(())
    }

    /// Session changes and finished background saves.
    fn poll_background(&mut self) -> Option<Effect> {
        while let Ok(event) = self.persist_rx.try_recv() {
            self.state.update(Message::Persisted(event));
        }

        if self.session_rx.has_changed().unwrap_or(false) {
            let user = self.session_rx.borrow_and_update().clone();
            return self.state.update(Message::SessionChanged(user));
        }
        None
    }

    async fn run_effect(&self, effect: Effect) -> Option<Message> {
        let message = match effect {
            Effect::LoadNews => Message::NewsLoaded(
                self.session.news().await.map_err(|err| err.to_string()),
            ),
            Effect::SignIn { email, password } => Message::AuthFinished(
                self.identity
                    .sign_in(&email, &password)
                    .await
                    .map(|_| ())
                    .map_err(|err| err.to_string()),
            ),
            Effect::SignUp { email, password } => Message::AuthFinished(
                self.identity
                    .sign_up(&email, &password)
                    .await
                    .map(|_| ())
                    .map_err(|err| err.to_string()),
            ),
            Effect::SignOut => {
                self.identity.sign_out().await;
                return None;
            }
            Effect::Upload(path) => Message::UploadFinished(
                self.session
                    .analyze_file(&path)
                    .await
                    .map_err(|err| err.to_string()),
            ),
            Effect::LoadHistory => Message::HistoryLoaded(
                self.session
                    .list_history()
                    .await
                    .map_err(|err| err.to_string()),
            ),
        };
        Some(message)
    }
}
