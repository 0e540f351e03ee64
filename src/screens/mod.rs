//! Screen controllers for the application.
//!
//! Each screen controller owns its state, renders itself, and reports what
//! should happen next as a [`ScreenAction`]; the app owns the navigation
//! stack and runs fetches on its runtime.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                      App                               │
//! │  ┌────────────────────────────────────────────────┐    │
//! │  │              Route Stack                       │    │
//! │  │  Home → Services → Saloons → Checkout          │    │
//! │  └────────────────────────────────────────────────┘    │
//! │                                                        │
//! │  ┌────────────────────────────────────────────────┐    │
//! │  │              Screen Trait                      │    │
//! │  │  - render(frame, area)                         │    │
//! │  │  - handle_event(event, context) -> Action      │    │
//! │  │  - initial_request() -> Option<FetchRequest>   │    │
//! │  │  - on_fetch(result)                            │    │
//! │  └────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Data arrives through [`Screen::on_fetch`] only after passing the
//! request-generation guard, so a screen never sees a stale reply.

pub mod checkout;
pub mod home;
pub mod saloons;
pub mod services;

pub use checkout::CheckoutScreen;
pub use home::HomeScreen;
pub use saloons::SaloonsScreen;
pub use services::ServicesScreen;

use crate::api::ApiError;
use crate::auth::Session;
use crate::config::Config;
use crate::fetch::{FetchOutcome, FetchRequest};
use crate::routes::Route;
use crate::styles::theme;
use anyhow::Result;
use crossterm::event::Event;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// Read-only resources shared with screens during event handling.
pub struct ScreenContext<'a> {
    pub config: &'a Config,
    pub session: Option<&'a Session>,
}

/// What a screen wants the app to do after handling an event.
#[derive(Debug, Clone)]
pub enum ScreenAction {
    /// Stay on the current screen.
    None,
    /// Push a route and mount its screen.
    Navigate(Route),
    /// Pop back to the previous screen.
    Back,
    /// Issue (or re-issue) a fetch for this screen.
    Fetch(FetchRequest),
    /// Quit the application.
    Quit,
}

/// Trait for screen controllers.
pub trait Screen {
    /// Render the screen.
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Handle an input event, returning the resulting action.
    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction>;

    /// The fetch this screen needs on mount, if any.
    fn initial_request(&self) -> Option<FetchRequest>;

    /// Apply a fetch result. Only called for the latest generation.
    fn on_fetch(&mut self, result: Result<FetchOutcome, ApiError>);

    /// Periodic tick for cosmetic timers. No data-correctness impact.
    fn tick(&mut self) {}

    /// True while a text input has focus, disabling navigation keys.
    fn is_input_focused(&self) -> bool {
        false
    }
}

/// Standard screen chrome: a title header, a footer hint line, and the
/// content area in between.
pub fn render_chrome(frame: &mut Frame, area: Rect, title: &str, footer: &str) -> Rect {
    let t = theme();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(title)
        .style(t.title_style())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(t.border_style()),
        );
    frame.render_widget(header, chunks[0]);

    let footer = Paragraph::new(footer)
        .style(t.muted_style())
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[2]);

    chunks[1]
}

/// Centered loading message.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let t = theme();
    let paragraph = Paragraph::new(message)
        .style(t.muted_style())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered_band(area));
}

/// Error message with the manual retry hint.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let t = theme();
    let text = format!("Virhe: {message}\n\nr: Yritä uudelleen");
    let paragraph = Paragraph::new(text)
        .style(t.error_style())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered_band(area));
}

/// Middle band of an area, used for centered status text.
fn centered_band(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);
    chunks[1]
}
