//! Application event loop and navigation.
//!
//! The app owns the terminal, the tokio runtime, the route stack, and the
//! one active screen. Screens describe fetches; the app stamps each with
//! a generation from the [`RequestGuard`], runs it on the runtime, and
//! feeds the reply back through an unbounded channel. Replies from
//! superseded requests are dropped before they reach the screen, so a
//! fast navigation or retry can never be overwritten by a stale response.

use crate::api::ApiClient;
use crate::auth::Session;
use crate::config::Config;
use crate::fetch::{execute, FetchReply, FetchRequest, RequestGuard};
use crate::routes::Route;
use crate::screens::{
    CheckoutScreen, HomeScreen, SaloonsScreen, Screen, ScreenAction, ScreenContext,
    ServicesScreen,
};
use crate::tui::Tui;
use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Main application state.
pub struct App {
    config: Config,
    api: Arc<ApiClient>,
    session: Option<Session>,
    tui: Tui,
    runtime: Runtime,
    guard: RequestGuard,
    reply_tx: mpsc::UnboundedSender<FetchReply>,
    reply_rx: mpsc::UnboundedReceiver<FetchReply>,
    /// Navigation stack; the last route is the mounted screen.
    stack: Vec<Route>,
    screen: Box<dyn Screen>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = Arc::new(ApiClient::new(config.base_url.clone()));
        let session = match Session::load(&Session::default_path()) {
            Ok(session) => session,
            Err(err) => {
                warn!("failed to load session: {err:#}");
                None
            }
        };
        let tui = Tui::new()?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            api,
            session,
            tui,
            runtime,
            guard: RequestGuard::new(),
            reply_tx,
            reply_rx,
            stack: Vec::new(),
            screen: Box::new(HomeScreen::new()),
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.tui.enter()?;
        let result = self.event_loop();
        self.tui.exit()?;
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        info!(base_url = self.config.base_url, "starting TUI");
        self.stack.clear();
        self.mount(Route::Home);

        loop {
            self.screen.tick();
            self.draw()?;

            if self.should_quit {
                break;
            }

            self.drain_replies();

            // Poll for events with 250ms timeout
            if let Some(event) = self.tui.poll_event(Duration::from_millis(250))? {
                self.handle_event(event)?;
            }
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let Self { tui, screen, .. } = self;
        tui.terminal_mut().draw(|frame| {
            let area = frame.area();
            screen.render(frame, area);
        })?;
        Ok(())
    }

    /// Apply buffered fetch replies, dropping superseded generations.
    fn drain_replies(&mut self) {
        while let Ok(reply) = self.reply_rx.try_recv() {
            if self.guard.accepts(reply.generation) {
                self.screen.on_fetch(reply.result);
            } else {
                debug!(generation = reply.generation, "dropping stale fetch reply");
            }
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        // Ctrl+C always quits, even while a text input has focus.
        if let Event::Key(key) = &event {
            if key.kind == KeyEventKind::Press
                && key.code == KeyCode::Char('c')
                && key.modifiers.contains(KeyModifiers::CONTROL)
            {
                self.should_quit = true;
                return Ok(());
            }
        }

        let ctx = ScreenContext {
            config: &self.config,
            session: self.session.as_ref(),
        };
        let action = self.screen.handle_event(event, &ctx)?;
        self.apply_action(action);
        Ok(())
    }

    fn apply_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Navigate(route) => self.navigate(route),
            ScreenAction::Back => self.back(),
            ScreenAction::Fetch(request) => self.dispatch(request),
            ScreenAction::Quit => self.should_quit = true,
        }
    }

    /// Push a route and mount its screen. Navigating home resets the
    /// stack instead of growing it.
    fn navigate(&mut self, route: Route) {
        if matches!(route, Route::Home) {
            self.stack.clear();
        }
        self.mount(route);
    }

    /// Pop the current route and remount the previous screen with a
    /// fresh fetch; the popped navigation context is discarded.
    fn back(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        self.stack.pop();
        if let Some(previous) = self.stack.pop() {
            self.mount(previous);
        }
    }

    fn mount(&mut self, route: Route) {
        info!(screen = route.name(), "navigating");
        self.screen = build_screen(&route);
        self.stack.push(route);
        if let Some(request) = self.screen.initial_request() {
            self.dispatch(request);
        }
    }

    /// Stamp a request with a fresh generation and run it on the
    /// runtime. The reply lands in the channel; `drain_replies` decides
    /// whether it is still current.
    fn dispatch(&mut self, request: FetchRequest) {
        let generation = self.guard.issue();
        let api = Arc::clone(&self.api);
        let tx = self.reply_tx.clone();
        debug!(generation, ?request, "dispatching fetch");
        self.runtime.spawn(async move {
            let result = execute(&api, request).await;
            let _ = tx.send(FetchReply { generation, result });
        });
    }
}

/// Screen controller for a route.
fn build_screen(route: &Route) -> Box<dyn Screen> {
    match route {
        Route::Home => Box::new(HomeScreen::new()),
        Route::Services(services) => Box::new(ServicesScreen::new(services.clone())),
        Route::Saloons(saloons) => Box::new(SaloonsScreen::new(saloons.clone())),
        Route::Checkout(checkout) => Box::new(CheckoutScreen::new(checkout.clone())),
    }
}
