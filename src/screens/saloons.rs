//! Saloons screen: the salons offering one selected service.
//!
//! Entered from the Services screen. When the user came through a
//! specific salon the screen shows only that salon (single-element
//! result); otherwise it lists every salon offering the service. Price
//! and duration on each card come from the salon's join record.

use crate::api::ApiError;
use crate::fetch::{FetchOutcome, FetchRequest, LoadState};
use crate::models::SaloonData;
use crate::routes::{Route, SaloonsRoute};
use crate::screens::{
    render_chrome, render_error, render_loading, Screen, ScreenAction, ScreenContext,
};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};
use ratatui::Frame;
use tracing::debug;

/// Saloons screen controller.
pub struct SaloonsScreen {
    route: SaloonsRoute,
    saloons: LoadState<Vec<SaloonData>>,
    selected: usize,
}

impl SaloonsScreen {
    pub fn new(route: SaloonsRoute) -> Self {
        Self {
            route,
            saloons: LoadState::Loading,
            selected: 0,
        }
    }

    /// The fetch this screen runs; retry re-issues the same value.
    fn request(&self) -> FetchRequest {
        match &self.route.salon_id {
            Some(salon_id) => FetchRequest::SalonById {
                salon_id: salon_id.clone(),
                service_id: self.route.service_id.clone(),
            },
            None => FetchRequest::SaloonsByService {
                service_id: self.route.service_id.clone(),
            },
        }
    }

    fn saloon_slice(&self) -> &[SaloonData] {
        self.saloons.data().map(Vec::as_slice).unwrap_or(&[])
    }

    fn selected_saloon(&self) -> Option<&SaloonData> {
        self.saloon_slice().get(self.selected)
    }

    fn move_up(&mut self) {
        let len = self.saloon_slice().len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    fn move_down(&mut self) {
        let len = self.saloon_slice().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    fn render_cards(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(format!(" {} ", self.route.service_name))
            .title_style(t.title_style());

        match &self.saloons {
            LoadState::Loading => {
                frame.render_widget(block, area);
                render_loading(frame, area, "Ladataan hoitoloita...");
            }
            LoadState::Failed(message) => {
                frame.render_widget(block, area);
                render_error(frame, area, message);
            }
            LoadState::Ready(saloons) if saloons.is_empty() => {
                frame.render_widget(block, area);
                render_loading(frame, area, "Ei hoitoloita tälle palvelulle.");
            }
            LoadState::Ready(saloons) => {
                let items: Vec<ListItem> = saloons
                    .iter()
                    .map(|saloon| {
                        let lines = vec![
                            Line::styled(saloon.name.clone(), t.emphasis_style()),
                            Line::styled(format!("  {}", saloon.short_intro), t.text_style()),
                            Line::styled(
                                format!(
                                    "  Price {}€ · Time {} min · {}",
                                    saloon.price,
                                    saloon.duration_minutes,
                                    stars(saloon.rating)
                                ),
                                t.muted_style(),
                            ),
                            Line::styled(format!("  {}", saloon.address), t.muted_style()),
                        ];
                        ListItem::new(Text::from(lines))
                    })
                    .collect();
                let list = List::new(items)
                    .block(block)
                    .highlight_style(t.highlight_style())
                    .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
                let mut state = ListState::default();
                state.select(Some(self.selected));
                frame.render_stateful_widget(list, area, &mut state);
            }
        }
    }
}

/// Five-star rating line, filled to the rounded rating.
fn stars(rating: f32) -> String {
    let filled = (rating.round().clamp(0.0, 5.0)) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

impl Screen for SaloonsScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content = render_chrome(
            frame,
            area,
            "Hoitolat",
            "↑↓: Navigate | Enter: Book | r: Retry | Esc: Back | q: Quit",
        );
        self.render_cards(frame, content);
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
                if let Some(saloon) = self.selected_saloon() {
                    debug!(saloon_id = saloon.id, "salon selected for booking");
                    let route = self.route.to_checkout(saloon);
                    return Ok(ScreenAction::Navigate(Route::Checkout(route)));
                }
            }
            KeyCode::Char('r') => {
                if matches!(self.saloons, LoadState::Failed(_)) {
                    self.saloons = LoadState::Loading;
                    return Ok(ScreenAction::Fetch(self.request()));
                }
            }
            KeyCode::Esc | KeyCode::Backspace => return Ok(ScreenAction::Back),
            KeyCode::Char('q') => return Ok(ScreenAction::Quit),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    fn initial_request(&self) -> Option<FetchRequest> {
        Some(self.request())
    }

    fn on_fetch(&mut self, result: Result<FetchOutcome, ApiError>) {
        match result {
            Ok(FetchOutcome::Saloons(saloons)) => {
                self.selected = 0;
                self.saloons = LoadState::Ready(saloons);
            }
            Ok(_) => {}
            Err(err) => self.saloons = LoadState::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(salon_id: Option<&str>) -> SaloonsRoute {
        SaloonsRoute {
            service_id: "svc-1".to_string(),
            service_name: "Classic".to_string(),
            category_label: "Ripset".to_string(),
            salon_id: salon_id.map(str::to_string),
        }
    }

    fn saloon(id: &str, price: f64) -> SaloonData {
        SaloonData {
            id: id.to_string(),
            name: format!("Salon {id}"),
            short_intro: String::new(),
            price,
            duration_minutes: 60,
            is_available: true,
            rating: 4.2,
            address: "Mannerheimintie 1".to_string(),
        }
    }

    #[test]
    fn test_data_source_follows_salon_presence() {
        assert_eq!(
            SaloonsScreen::new(route(None)).initial_request(),
            Some(FetchRequest::SaloonsByService {
                service_id: "svc-1".to_string()
            })
        );
        assert_eq!(
            SaloonsScreen::new(route(Some("salon-3"))).initial_request(),
            Some(FetchRequest::SalonById {
                salon_id: "salon-3".to_string(),
                service_id: "svc-1".to_string()
            })
        );
    }

    #[test]
    fn test_booking_carries_join_pricing() {
        let mut screen = SaloonsScreen::new(route(None));
        screen.on_fetch(Ok(FetchOutcome::Saloons(vec![saloon("a", 49.0)])));
        let selected = screen.selected_saloon().unwrap();
        let checkout = screen.route.to_checkout(selected);
        assert_eq!(checkout.saloon_id, "a");
        assert_eq!(checkout.price, 49.0);
        assert_eq!(checkout.service_id, "svc-1");
    }

    #[test]
    fn test_selection_wraps() {
        let mut screen = SaloonsScreen::new(route(None));
        screen.on_fetch(Ok(FetchOutcome::Saloons(vec![
            saloon("a", 49.0),
            saloon("b", 59.0),
        ])));
        screen.move_up();
        assert_eq!(screen.selected_saloon().unwrap().id, "b");
        screen.move_down();
        assert_eq!(screen.selected_saloon().unwrap().id, "a");
    }

    #[test]
    fn test_stars_are_clamped_to_five() {
        assert_eq!(stars(4.2), "★★★★☆");
        assert_eq!(stars(9.0), "★★★★★");
        assert_eq!(stars(-1.0), "☆☆☆☆☆");
    }

    #[test]
    fn test_fetch_error_is_stored() {
        let mut screen = SaloonsScreen::new(route(None));
        screen.on_fetch(Err(ApiError::Status {
            status: 404,
            message: "not found".to_string(),
        }));
        assert!(matches!(screen.saloons, LoadState::Failed(_)));
    }
}
