use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::io::api::{ApiClient, ApiError, CategoryStore};
use crate::io::{config_io, logging};
use crate::ops::reorder::{MoveOutcome, ReorderSession, ScopeFilter};

use super::input;
use super::render;
use super::theme::Theme;

/// How long a success banner stays up
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(5);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// A category is grabbed; the cursor picks the drop target
    Move,
}

/// Message shown above the status row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success { text: String, shown_at: Instant },
    Info(String),
    Error(String),
    /// Session expired or missing
    Auth(String),
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Success { text, .. } => text,
            Banner::Info(t) | Banner::Error(t) | Banner::Auth(t) => t,
        }
    }
}

/// A destructive key press waiting for its second press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Quit,
    Reload,
}

/// Main application state
pub struct App {
    pub session: ReorderSession,
    store: Box<dyn CategoryStore>,
    pub theme: Theme,
    pub mode: Mode,
    /// Cursor index into the scoped view
    pub cursor: usize,
    /// First visible row
    pub scroll_offset: usize,
    /// Category carried in Move mode
    pub grabbed: Option<i64>,
    pub banner: Option<Banner>,
    pub pending: Option<Pending>,
    pub show_help: bool,
    pub show_key_hints: bool,
    pub should_quit: bool,
    /// Shown in the header
    pub source: String,
}

impl App {
    pub fn new(store: Box<dyn CategoryStore>, theme: Theme) -> Self {
        App {
            session: ReorderSession::default(),
            store,
            theme,
            mode: Mode::Navigate,
            cursor: 0,
            scroll_offset: 0,
            grabbed: None,
            banner: None,
            pending: None,
            show_help: false,
            show_key_hints: true,
            should_quit: false,
            source: String::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    pub fn view_len(&self) -> usize {
        self.session.view().len()
    }

    /// Id of the category under the cursor
    pub fn cursor_id(&self) -> Option<i64> {
        self.session.view().get(self.cursor).map(|c| c.id)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.view_len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn cursor_to(&mut self, index: usize) {
        self.cursor = index.min(self.view_len().saturating_sub(1));
    }

    /// Put the cursor on `id` if it is in the view
    pub fn focus(&mut self, id: i64) {
        if let Some(pos) = self.session.view().iter().position(|c| c.id == id) {
            self.cursor = pos;
        }
    }

    fn clamp_cursor(&mut self) {
        self.cursor_to(self.cursor);
    }

    // -----------------------------------------------------------------------
    // Moving
    // -----------------------------------------------------------------------

    pub fn grab(&mut self) {
        if let Some(id) = self.cursor_id() {
            self.grabbed = Some(id);
            self.mode = Mode::Move;
        }
    }

    /// Drop the grabbed category onto the cursor row
    pub fn drop_grabbed(&mut self) -> MoveOutcome {
        let (Some(active), Some(over)) = (self.grabbed.take(), self.cursor_id()) else {
            self.mode = Mode::Navigate;
            return MoveOutcome::Unchanged;
        };
        self.mode = Mode::Navigate;
        let outcome = self.session.move_item(active, over);
        self.focus(active);
        match outcome {
            MoveOutcome::Unchanged => {}
            MoveOutcome::Assigned { .. } => {
                self.banner = Some(Banner::Info("Order changed. Press s to save".into()));
            }
            MoveOutcome::Renumbered { count } => {
                self.banner = Some(Banner::Info(format!(
                    "Renumbered {} categories. Press s to save",
                    count
                )));
            }
        }
        outcome
    }

    pub fn cancel_grab(&mut self) {
        if let Some(id) = self.grabbed.take() {
            self.focus(id);
        }
        self.mode = Mode::Navigate;
    }

    /// All → Top-level → each parent with children → All
    pub fn cycle_scope(&mut self) {
        let parents: Vec<i64> = self.session.parents().iter().map(|c| c.id).collect();
        let next = match self.session.filter() {
            ScopeFilter::All => ScopeFilter::TopLevel,
            ScopeFilter::TopLevel => parents
                .first()
                .map(|&id| ScopeFilter::Parent(id))
                .unwrap_or(ScopeFilter::All),
            ScopeFilter::Parent(id) => parents
                .iter()
                .position(|&p| p == id)
                .and_then(|i| parents.get(i + 1))
                .map(|&next| ScopeFilter::Parent(next))
                .unwrap_or(ScopeFilter::All),
        };
        self.session.set_filter(next);
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    // -----------------------------------------------------------------------
    // Store
    // -----------------------------------------------------------------------

    fn failure_banner(err: &ApiError, action: &str) -> Banner {
        warn!(error = %err, action, "category store call failed");
        if err.is_auth() {
            Banner::Auth(format!(
                "Session expired: set api.token (bka config set api.token ...) and press r ({})",
                err
            ))
        } else {
            Banner::Error(format!("{} failed: {}", action, err))
        }
    }

    /// Fetch categories, replacing the in-memory list
    pub fn load(&mut self) {
        match self.store.fetch_categories() {
            Ok(categories) => {
                let count = categories.len();
                self.session.replace_categories(categories);
                self.clamp_cursor();
                self.banner = None;
                info!(count, "loaded categories");
            }
            Err(e) => self.banner = Some(Self::failure_banner(&e, "Loading categories")),
        }
    }

    /// Send every category's key in one batch
    pub fn save(&mut self, now: Instant) {
        if !self.session.is_dirty() {
            self.banner = Some(Banner::Info("Nothing to save".into()));
            return;
        }
        let payload = self.session.sort_payload();
        match self.store.save_sort(&payload) {
            Ok(()) => {
                self.session.mark_saved();
                self.banner = Some(Banner::Success {
                    text: format!("Saved order of {} categories", payload.len()),
                    shown_at: now,
                });
            }
            Err(e) => self.banner = Some(Self::failure_banner(&e, "Saving")),
        }
    }

    /// Reload from the backend. Unsaved changes need a second press.
    pub fn reload(&mut self) {
        if self.session.is_dirty() && self.pending != Some(Pending::Reload) {
            self.pending = Some(Pending::Reload);
            self.banner = Some(Banner::Info(
                "Unsaved changes. Press r again to discard and reload".into(),
            ));
            return;
        }
        self.pending = None;
        self.load();
    }

    pub fn request_quit(&mut self) {
        if self.session.is_dirty() && self.pending != Some(Pending::Quit) {
            self.pending = Some(Pending::Quit);
            self.banner = Some(Banner::Info(
                "Unsaved changes. Press q again to quit without saving".into(),
            ));
            return;
        }
        self.should_quit = true;
    }

    /// Expire the success banner
    pub fn tick(&mut self, now: Instant) {
        if let Some(Banner::Success { shown_at, .. }) = &self.banner
            && now.duration_since(*shown_at) >= SUCCESS_BANNER_TTL
        {
            self.banner = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal loop
// ---------------------------------------------------------------------------

pub fn run(
    config_path: Option<&Path>,
    api_url: Option<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_io::config_path(config_path);
    let config = config_io::load_config(&path, api_url)?;
    let log_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(config_io::config_dir);
    logging::init_file(&log_dir.join("bka.log"), verbose);

    let client = ApiClient::new(&config.api)?;
    let mut app = App::new(Box::new(client.clone()), Theme::from_config(&config.ui));
    app.show_key_hints = config.ui.show_key_hints;
    app.source = client.base_url().to_string();
    app.load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
