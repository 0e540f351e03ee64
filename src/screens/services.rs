//! Services screen: the grouped service list for one category or one
//! salon.
//!
//! The entry route decides everything: data source (category catalog vs
//! salon offering), grouping strategy, and whether the displayed category
//! label is passed through or computed from the fetched data. Groups with
//! sub-services render as a header plus selectable rows; a group without
//! sub-services is itself the selectable row. Selecting a row always
//! forwards that row's own service identity, never its parent's.

use crate::api::ApiError;
use crate::fetch::{FetchOutcome, FetchRequest, LoadState};
use crate::grouping::{category_label, group_services, DEFAULT_CATEGORY_LABEL};
use crate::models::Service;
use crate::routes::{Route, ServicesRoute};
use crate::screens::{
    render_chrome, render_error, render_loading, Screen, ScreenAction, ScreenContext,
};
use crate::styles::{theme, LIST_HIGHLIGHT_SYMBOL};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};
use ratatui::Frame;
use tracing::debug;

/// One display row of the grouped list.
#[derive(Debug, Clone)]
enum ServiceRow {
    /// Group header; not selectable.
    Header(String),
    /// Selectable, bookable service.
    Item(Service),
}

/// Services screen controller.
pub struct ServicesScreen {
    route: ServicesRoute,
    rows: LoadState<Vec<ServiceRow>>,
    /// Display label; computed from data for salon entries.
    label: String,
    selected: usize,
}

impl ServicesScreen {
    pub fn new(route: ServicesRoute) -> Self {
        let label = match &route {
            ServicesRoute::ByCategory { category_name } => category_name.clone(),
            ServicesRoute::BySalon { salon_name, .. } => salon_name
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY_LABEL.to_string()),
        };
        Self {
            route,
            rows: LoadState::Loading,
            label,
            selected: 0,
        }
    }

    /// The fetch this screen runs, kept in one place so first fetch and
    /// retry cannot drift apart.
    fn request(&self) -> FetchRequest {
        match &self.route {
            ServicesRoute::ByCategory { category_name } => FetchRequest::ServicesByCategory {
                category_name: category_name.clone(),
            },
            ServicesRoute::BySalon { salon_id, .. } => FetchRequest::ServicesBySalon {
                salon_id: salon_id.clone(),
            },
        }
    }

    fn row_slice(&self) -> &[ServiceRow] {
        self.rows.data().map(Vec::as_slice).unwrap_or(&[])
    }

    fn selected_service(&self) -> Option<&Service> {
        match self.row_slice().get(self.selected) {
            Some(ServiceRow::Item(service)) => Some(service),
            _ => None,
        }
    }

    /// Move selection to the next Item row in the given direction,
    /// skipping headers.
    fn move_selection(&mut self, step: isize) {
        let rows = self.row_slice();
        if rows.is_empty() {
            return;
        }
        let len = rows.len() as isize;
        let mut index = self.selected as isize;
        for _ in 0..len {
            index = (index + step).rem_euclid(len);
            if matches!(rows[index as usize], ServiceRow::Item(_)) {
                self.selected = index as usize;
                return;
            }
        }
    }

    /// First selectable row, if any.
    fn first_item_index(rows: &[ServiceRow]) -> usize {
        rows.iter()
            .position(|row| matches!(row, ServiceRow::Item(_)))
            .unwrap_or(0)
    }

    fn apply_services(&mut self, services: Vec<Service>) {
        let groups = group_services(&services, self.route.origin());
        if matches!(self.route, ServicesRoute::BySalon { .. }) {
            self.label = category_label(&services, DEFAULT_CATEGORY_LABEL);
        }

        let mut rows = Vec::new();
        for group in groups {
            if group.sub_services.is_empty() {
                rows.push(ServiceRow::Item(group.root));
            } else {
                rows.push(ServiceRow::Header(group.root.name.clone()));
                rows.extend(group.sub_services.into_iter().map(ServiceRow::Item));
            }
        }
        debug!(rows = rows.len(), label = self.label, "grouped services");
        self.selected = Self::first_item_index(&rows);
        self.rows = LoadState::Ready(rows);
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(t.border_style())
            .title(format!(" {} ", self.label))
            .title_style(t.title_style());

        match &self.rows {
            LoadState::Loading => {
                frame.render_widget(block, area);
                render_loading(frame, area, "Ladataan palveluita...");
            }
            LoadState::Failed(message) => {
                frame.render_widget(block, area);
                render_error(frame, area, message);
            }
            LoadState::Ready(rows) if rows.is_empty() => {
                frame.render_widget(block, area);
                render_loading(frame, area, "Ei palveluita.");
            }
            LoadState::Ready(rows) => {
                let items: Vec<ListItem> = rows
                    .iter()
                    .map(|row| match row {
                        ServiceRow::Header(name) => {
                            ListItem::new(Line::styled(name.clone(), t.title_style()))
                        }
                        ServiceRow::Item(service) => {
                            ListItem::new(Line::styled(describe(service), t.text_style()))
                        }
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

/// Row text for one bookable service.
fn describe(service: &Service) -> String {
    let mut text = format!("  {}", service.name);
    if let Some(price) = service.price {
        text.push_str(&format!("  —  {price}€"));
    }
    if let Some(minutes) = service.duration_minutes {
        text.push_str(&format!(" · {minutes} min"));
    }
    text
}

impl Screen for ServicesScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content = render_chrome(
            frame,
            area,
            "Palvelut",
            "↑↓: Navigate | Enter: Select | r: Retry | Esc: Back | q: Quit",
        );
        self.render_list(frame, content);
    }

    fn handle_event(&mut self, event: Event, _ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(ScreenAction::None);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter => {
                if let Some(selected) = self.selected_service() {
                    debug!(service_id = selected.id, "service selected");
                    let route = self.route.to_saloons(selected, &self.label);
                    return Ok(ScreenAction::Navigate(Route::Saloons(route)));
                }
            }
            KeyCode::Char('r') => {
                if matches!(self.rows, LoadState::Failed(_)) {
                    self.rows = LoadState::Loading;
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
            Ok(FetchOutcome::Services(services)) => self.apply_services(services),
            Ok(_) => {}
            Err(err) => self.rows = LoadState::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn service(id: &str, name: &str) -> Service {
        Service {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            category_id: "cat-1".to_string(),
            parent_service_id: None,
            price: None,
            duration_minutes: None,
            is_popular: false,
            category: None,
            parent_service: None,
        }
    }

    fn child_of(id: &str, name: &str, parent_id: &str) -> Service {
        Service {
            parent_service_id: Some(parent_id.to_string()),
            ..service(id, name)
        }
    }

    fn by_category(name: &str) -> ServicesScreen {
        ServicesScreen::new(ServicesRoute::ByCategory {
            category_name: name.to_string(),
        })
    }

    fn by_salon(id: &str) -> ServicesScreen {
        ServicesScreen::new(ServicesRoute::BySalon {
            salon_id: id.to_string(),
            salon_name: None,
        })
    }

    #[test]
    fn test_data_source_follows_route() {
        assert_eq!(
            by_category("Hieronnat").initial_request(),
            Some(FetchRequest::ServicesByCategory {
                category_name: "Hieronnat".to_string()
            })
        );
        assert_eq!(
            by_salon("salon-1").initial_request(),
            Some(FetchRequest::ServicesBySalon {
                salon_id: "salon-1".to_string()
            })
        );
    }

    #[test]
    fn test_category_label_passes_through_for_category_entry() {
        let mut screen = by_category("Kynsihoidot");
        screen.on_fetch(Ok(FetchOutcome::Services(vec![service("s1", "Geelit")])));
        assert_eq!(screen.label, "Kynsihoidot");
    }

    #[test]
    fn test_category_label_is_computed_for_salon_entry() {
        let mut screen = by_salon("salon-1");
        let mut first = service("s1", "Classic");
        first.category = Some(Category {
            id: "c1".to_string(),
            name: "Ripset".to_string(),
            store_id: None,
        });
        let mut second = service("s2", "Gel");
        second.category = Some(Category {
            id: "c2".to_string(),
            name: "Kynnet".to_string(),
            store_id: None,
        });
        screen.on_fetch(Ok(FetchOutcome::Services(vec![first, second])));
        assert_eq!(screen.label, "Ripset, Kynnet");
    }

    #[test]
    fn test_salon_entry_without_category_names_uses_fallback() {
        let mut screen = by_salon("salon-1");
        screen.on_fetch(Ok(FetchOutcome::Services(vec![service("s1", "Classic")])));
        assert_eq!(screen.label, DEFAULT_CATEGORY_LABEL);
    }

    #[test]
    fn test_selection_skips_group_headers() {
        let mut screen = by_category("Ripset");
        screen.on_fetch(Ok(FetchOutcome::Services(vec![
            service("root-1", "Ripsienpidennykset"),
            child_of("sub-1", "Classic", "root-1"),
            child_of("sub-2", "Volume", "root-1"),
        ])));
        // Row 0 is the header; selection starts on the first sub-service.
        assert_eq!(screen.selected, 1);
        screen.move_selection(1);
        assert_eq!(screen.selected_service().unwrap().id, "sub-2");
        screen.move_selection(1);
        // Wraps past the header back to the first item.
        assert_eq!(screen.selected_service().unwrap().id, "sub-1");
    }

    #[test]
    fn test_selection_forwards_sub_service_identity() {
        let mut screen = by_category("Ripset");
        screen.on_fetch(Ok(FetchOutcome::Services(vec![
            service("root-1", "Ripsienpidennykset"),
            child_of("sub-1", "Classic", "root-1"),
        ])));
        let selected = screen.selected_service().unwrap().clone();
        let route = screen.route.to_saloons(&selected, &screen.label);
        assert_eq!(route.service_id, "sub-1");
        assert_eq!(route.service_name, "Classic");
    }

    #[test]
    fn test_standalone_root_is_directly_selectable() {
        let mut screen = by_category("Hieronnat");
        screen.on_fetch(Ok(FetchOutcome::Services(vec![service(
            "solo", "Gua Sha",
        )])));
        assert_eq!(screen.selected_service().unwrap().id, "solo");
    }

    #[test]
    fn test_retry_reissues_the_same_request() {
        let screen = by_salon("salon-9");
        // The retry path re-issues exactly the initial request value.
        assert_eq!(Some(screen.request()), screen.initial_request());
    }

    #[test]
    fn test_fetch_error_is_stored() {
        let mut screen = by_category("Ripset");
        screen.on_fetch(Err(ApiError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        }));
        assert!(matches!(screen.rows, LoadState::Failed(_)));
    }
}
