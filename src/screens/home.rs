//! Home screen: hero banner, popular-service shortcuts, and the category
//! list fetched from the platform.
//!
//! Selecting a shortcut or a category navigates to the Services screen
//! with that category name.

use crate::api::ApiError;
use crate::fetch::{FetchOutcome, FetchRequest, LoadState};
use crate::models::Category;
use crate::routes::{Route, ServicesRoute};
use crate::screens::{
    render_chrome, render_error, render_loading, Screen, ScreenAction, ScreenContext,
};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use std::time::{Duration, Instant};
use tracing::debug;

/// Seasonal shortcuts shown above the category list.
const POPULAR_SERVICES: [&str; 4] = [
    "Gua Sha hoidot",
    "Ripsienpidennykset",
    "Hieronnat",
    "Kynsihoidot",
];

/// The two hero lines the banner alternates between.
const HERO_TEXTS: [&str; 2] = ["Palvelut nyt!", "Kartta"];

/// How often the hero line flips.
const HERO_INTERVAL: Duration = Duration::from_secs(4);

/// Home screen controller.
pub struct HomeScreen {
    categories: LoadState<Vec<Category>>,
    /// Index into popular shortcuts first, then fetched categories.
    selected: usize,
    hero_index: usize,
    hero_flipped_at: Instant,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self {
            categories: LoadState::Loading,
            selected: 0,
            hero_index: 0,
            hero_flipped_at: Instant::now(),
        }
    }

    fn category_names(&self) -> &[Category] {
        self.categories.data().map(Vec::as_slice).unwrap_or(&[])
    }

    fn total_items(&self) -> usize {
        POPULAR_SERVICES.len() + self.category_names().len()
    }

    /// Label of the currently selected row.
    fn selected_label(&self) -> Option<String> {
        if self.selected < POPULAR_SERVICES.len() {
            return Some(POPULAR_SERVICES[self.selected].to_string());
        }
        self.category_names()
            .get(self.selected - POPULAR_SERVICES.len())
            .map(|category| category.name.clone())
    }

    fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.total_items().saturating_sub(1);
        }
    }

    fn move_down(&mut self) {
        if self.selected + 1 < self.total_items() {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }

    fn render_content(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(POPULAR_SERVICES.len() as u16 + 2),
                Constraint::Min(3),
            ])
            .split(area);

        // Hero banner with the rotating line.
        let hero = Paragraph::new(HERO_TEXTS[self.hero_index])
            .style(t.title_style())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(t.border_style()),
            );
        frame.render_widget(hero, chunks[0]);

        // Popular shortcuts.
        let popular_items: Vec<ListItem> = POPULAR_SERVICES
            .iter()
            .map(|label| ListItem::new(*label).style(t.text_style()))
            .collect();
        let popular_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(" Kauden suosituimmat palvelut ")
            .title_style(t.title_style());
        let popular_list = List::new(popular_items)
            .block(popular_block)
            .highlight_style(t.highlight_style())
            .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
        let mut popular_state = ListState::default();
        if self.selected < POPULAR_SERVICES.len() {
            popular_state.select(Some(self.selected));
        }
        frame.render_stateful_widget(popular_list, chunks[1], &mut popular_state);

        // Categories from the platform.
        let category_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(" Kategoriat ")
            .title_style(t.title_style());

        match &self.categories {
            LoadState::Loading => {
                frame.render_widget(category_block, chunks[2]);
                render_loading(frame, chunks[2], "Ladataan kategorioita...");
            }
            LoadState::Failed(message) => {
                frame.render_widget(category_block, chunks[2]);
                render_error(frame, chunks[2], message);
            }
            LoadState::Ready(categories) => {
                let items: Vec<ListItem> = categories
                    .iter()
                    .map(|category| ListItem::new(category.name.clone()).style(t.text_style()))
                    .collect();
                let list = List::new(items)
                    .block(category_block)
                    .highlight_style(t.highlight_style())
                    .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
                let mut state = ListState::default();
                if self.selected >= POPULAR_SERVICES.len() {
                    state.select(Some(self.selected - POPULAR_SERVICES.len()));
                }
                frame.render_stateful_widget(list, chunks[2], &mut state);
            }
        }
    }
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for HomeScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content = render_chrome(
            frame,
            area,
            "Cosmix — Hemmottelu, jonka ansaitset.",
            "↑↓: Navigate | Enter: Select | r: Retry | q: Quit",
        );
        self.render_content(frame, content);
    }

    fn handle_event(&mut self, event: Event, _ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(ScreenAction::None);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Enter => {
                if let Some(category_name) = self.selected_label() {
                    debug!(category_name, "category selected");
                    let route = ServicesRoute::ByCategory { category_name };
                    return Ok(ScreenAction::Navigate(Route::Services(route)));
                }
            }
            KeyCode::Char('r') => {
                if matches!(self.categories, LoadState::Failed(_)) {
                    self.categories = LoadState::Loading;
                    return Ok(ScreenAction::Fetch(FetchRequest::Categories));
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => return Ok(ScreenAction::Quit),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    fn initial_request(&self) -> Option<FetchRequest> {
        Some(FetchRequest::Categories)
    }

    fn on_fetch(&mut self, result: Result<FetchOutcome, ApiError>) {
        self.categories = match result {
            Ok(FetchOutcome::Categories(categories)) => LoadState::Ready(categories),
            Ok(_) => return,
            Err(err) => LoadState::Failed(err.to_string()),
        };
        self.selected = self.selected.min(self.total_items().saturating_sub(1));
    }

    fn tick(&mut self) {
        if self.hero_flipped_at.elapsed() >= HERO_INTERVAL {
            self.hero_index = (self.hero_index + 1) % HERO_TEXTS.len();
            self.hero_flipped_at = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            store_id: None,
        }
    }

    #[test]
    fn test_initial_request_is_categories() {
        let screen = HomeScreen::new();
        assert_eq!(screen.initial_request(), Some(FetchRequest::Categories));
    }

    #[test]
    fn test_selection_spans_popular_and_categories() {
        let mut screen = HomeScreen::new();
        screen.on_fetch(Ok(FetchOutcome::Categories(vec![
            category("c1", "Kynsihoidot"),
            category("c2", "Hieronnat"),
        ])));

        assert_eq!(screen.selected_label().as_deref(), Some("Gua Sha hoidot"));
        for _ in 0..POPULAR_SERVICES.len() {
            screen.move_down();
        }
        assert_eq!(screen.selected_label().as_deref(), Some("Kynsihoidot"));
    }

    #[test]
    fn test_selection_wraps_around() {
        let mut screen = HomeScreen::new();
        screen.move_up();
        assert_eq!(screen.selected, POPULAR_SERVICES.len() - 1);
        screen.move_down();
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn test_fetch_error_is_stored_for_display() {
        let mut screen = HomeScreen::new();
        screen.on_fetch(Err(ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        }));
        assert!(matches!(screen.categories, LoadState::Failed(_)));
    }

    #[test]
    fn test_hero_text_flips_on_interval() {
        let mut screen = HomeScreen::new();
        assert_eq!(screen.hero_index, 0);
        screen.hero_flipped_at = Instant::now() - HERO_INTERVAL;
        screen.tick();
        assert_eq!(screen.hero_index, 1);
        screen.hero_flipped_at = Instant::now() - HERO_INTERVAL;
        screen.tick();
        assert_eq!(screen.hero_index, 0);
    }
}
