//! Checkout screen: customer details form and booking submission.
//!
//! The booked service arrives fully priced in the route (price and
//! duration from the salon's join record). Submission goes through the
//! same fetch pipeline as the read screens; a signed-in session attaches
//! its bearer token, otherwise the booking is a guest checkout.

use crate::api::ApiError;
use crate::fetch::{FetchOutcome, FetchRequest};
use crate::models::{CheckoutResponse, CustomerInfo};
use crate::routes::{CheckoutRoute, Route};
use crate::screens::{render_chrome, render_error, Screen, ScreenAction, ScreenContext};
use crate::styles::theme;
use crate::widgets::{TextInput, TextInputWidget, TextInputWidgetExt};
use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, info};

/// Form fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Email,
    Phone,
    BookingTime,
    Notes,
}

const FIELDS: [Field; 5] = [
    Field::Name,
    Field::Email,
    Field::Phone,
    Field::BookingTime,
    Field::Notes,
];

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Name => "Nimi",
            Field::Email => "Sähköposti",
            Field::Phone => "Puhelin",
            Field::BookingTime => "Aika",
            Field::Notes => "Lisätiedot",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "Anna Asiakas",
            Field::Email => "anna@example.com",
            Field::Phone => "+358 40 123 4567",
            Field::BookingTime => "2026-03-01T10:00:00Z",
            Field::Notes => "",
        }
    }
}

/// Where the screen is in the booking flow.
#[derive(Debug)]
enum Phase {
    Form,
    Submitting,
    /// Submission failed; retry re-issues the stored request verbatim.
    Failed(String),
    Done(CheckoutResponse),
}

/// Checkout screen controller.
pub struct CheckoutScreen {
    route: CheckoutRoute,
    name: TextInput,
    email: TextInput,
    phone: TextInput,
    booking_time: TextInput,
    notes: TextInput,
    focus: usize,
    phase: Phase,
    /// Validation failure shown under the form.
    error: Option<String>,
    /// The submitted request, re-issued verbatim on retry.
    last_request: Option<FetchRequest>,
}

impl CheckoutScreen {
    pub fn new(route: CheckoutRoute) -> Self {
        Self {
            route,
            name: TextInput::new(),
            email: TextInput::new(),
            phone: TextInput::new(),
            booking_time: TextInput::new(),
            notes: TextInput::new(),
            focus: 0,
            phase: Phase::Form,
            error: None,
            last_request: None,
        }
    }

    fn input_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::BookingTime => &mut self.booking_time,
            Field::Notes => &mut self.notes,
        }
    }

    fn input(&self, field: Field) -> &TextInput {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::BookingTime => &self.booking_time,
            Field::Notes => &self.notes,
        }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FIELDS.len();
    }

    fn focus_prev(&mut self) {
        self.focus = (self.focus + FIELDS.len() - 1) % FIELDS.len();
    }

    /// Validate the form into the customer record, or explain what is
    /// missing.
    fn customer_info(&self, user_id: Option<String>) -> Result<CustomerInfo, String> {
        if self.name.is_empty() || self.email.is_empty() || self.phone.is_empty() {
            return Err("Täytä nimi, sähköposti ja puhelin".to_string());
        }
        let booking_time: DateTime<Utc> = self
            .booking_time
            .text_trimmed()
            .parse()
            .map_err(|_| "Aika ei kelpaa (esim. 2026-03-01T10:00:00Z)".to_string())?;
        let notes = match self.notes.text_trimmed() {
            "" => None,
            text => Some(text.to_string()),
        };
        Ok(CustomerInfo {
            user_id,
            name: self.name.text_trimmed().to_string(),
            email: self.email.text_trimmed().to_string(),
            phone: self.phone.text_trimmed().to_string(),
            booking_time,
            notes,
        })
    }

    fn submit(&mut self, ctx: &ScreenContext) -> ScreenAction {
        let user_id = ctx.session.and_then(|session| session.user_id.clone());
        let customer_info = match self.customer_info(user_id) {
            Ok(info) => info,
            Err(message) => {
                self.error = Some(message);
                return ScreenAction::None;
            }
        };

        let request = FetchRequest::Checkout {
            refs: vec![self.route.service_ref()],
            customer_info,
            auth_token: ctx.session.and_then(|session| session.token.clone()),
        };
        info!(
            saloon_id = self.route.saloon_id,
            service_id = self.route.service_id,
            "submitting booking"
        );
        self.error = None;
        self.phase = Phase::Submitting;
        self.last_request = Some(request.clone());
        ScreenAction::Fetch(request)
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let lines = vec![
            Line::styled(self.route.service_name.clone(), t.emphasis_style()),
            Line::styled(
                format!("{} · {}", self.route.saloon_name, self.route.category_label),
                t.text_style(),
            ),
            Line::styled(
                format!(
                    "Price {}€ · Time {} min",
                    self.route.price, self.route.duration_minutes
                ),
                t.muted_style(),
            ),
        ];
        let summary = Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(t.border_style())
                .title(" Varaus ")
                .title_style(t.title_style()),
        );
        frame.render_widget(summary, area);
    }

    fn render_form(&mut self, frame: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(5)];
        constraints.extend(std::iter::repeat(Constraint::Length(3)).take(FIELDS.len()));
        constraints.push(Constraint::Min(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_summary(frame, chunks[0]);

        for (index, field) in FIELDS.iter().enumerate() {
            let widget = TextInputWidget::new(self.input(*field))
                .title(field.label())
                .placeholder(field.placeholder())
                .focused(index == self.focus);
            frame.render_text_input_widget(widget, chunks[index + 1]);
        }

        let t = theme();
        let status = match (&self.phase, &self.error) {
            (Phase::Submitting, _) => {
                Paragraph::new("Lähetetään varausta...").style(t.muted_style())
            }
            (_, Some(message)) => {
                Paragraph::new(format!("Virhe: {message}")).style(t.error_style())
            }
            _ => Paragraph::new("Enter: Lähetä varaus").style(t.muted_style()),
        };
        frame.render_widget(status.wrap(Wrap { trim: true }), chunks[FIELDS.len() + 1]);
    }

    /// Re-issue the stored request after a failed submission.
    fn retry(&mut self) -> ScreenAction {
        match self.last_request.clone() {
            Some(request) => {
                debug!("retrying booking submission");
                self.phase = Phase::Submitting;
                ScreenAction::Fetch(request)
            }
            None => {
                self.phase = Phase::Form;
                ScreenAction::None
            }
        }
    }

    fn render_result(&self, frame: &mut Frame, area: Rect, response: &CheckoutResponse) {
        let t = theme();
        let headline_style = if response.success {
            t.success_style()
        } else {
            t.error_style()
        };
        let mut lines = vec![
            Line::styled(response.message.clone(), headline_style),
            Line::default(),
            Line::styled(
                format!("Summa: {}€ ({})", response.amount, response.payment_method),
                t.text_style(),
            ),
            Line::styled(format!("Tila: {}", response.status), t.text_style()),
        ];
        if !response.booking_ids.is_empty() {
            lines.push(Line::styled(
                format!("Varaukset: {}", response.booking_ids.join(", ")),
                t.muted_style(),
            ));
        }
        let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(t.border_style())
                .title(" Varaus lähetetty ")
                .title_style(t.title_style()),
        );
        frame.render_widget(paragraph, area);
    }
}

impl Screen for CheckoutScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let footer = match self.phase {
            Phase::Done(_) => "Enter: Etusivulle | q: Quit",
            Phase::Failed(_) => "r: Retry | Esc: Edit | q: Quit",
            _ => "Tab: Next field | Enter: Submit | Esc: Back",
        };
        let content = render_chrome(frame, area, "Ajanvaraus", footer);
        match &self.phase {
            Phase::Done(response) => {
                let response = response.clone();
                self.render_result(frame, content, &response);
            }
            Phase::Failed(message) => {
                let message = message.clone();
                render_error(frame, content, &message);
            }
            _ => self.render_form(frame, content),
        }
    }

    fn handle_event(&mut self, event: Event, ctx: &ScreenContext) -> Result<ScreenAction> {
        let Event::Key(key) = event else {
            return Ok(ScreenAction::None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(ScreenAction::None);
        }

        match self.phase {
            Phase::Done(_) => {
                return Ok(match key.code {
                    KeyCode::Enter => ScreenAction::Navigate(Route::Home),
                    KeyCode::Char('q') | KeyCode::Esc => ScreenAction::Quit,
                    _ => ScreenAction::None,
                });
            }
            Phase::Failed(_) => {
                return Ok(match key.code {
                    KeyCode::Char('r') => self.retry(),
                    KeyCode::Esc | KeyCode::Backspace => {
                        self.phase = Phase::Form;
                        ScreenAction::None
                    }
                    KeyCode::Char('q') => ScreenAction::Quit,
                    _ => ScreenAction::None,
                });
            }
            Phase::Submitting => return Ok(ScreenAction::None),
            Phase::Form => {}
        }

        match key.code {
            KeyCode::Esc => return Ok(ScreenAction::Back),
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Enter => return Ok(self.submit(ctx)),
            code => {
                let field = FIELDS[self.focus];
                self.input_mut(field).handle_key(code);
            }
        }
        Ok(ScreenAction::None)
    }

    fn initial_request(&self) -> Option<FetchRequest> {
        // The form is filled before anything is sent.
        None
    }

    fn on_fetch(&mut self, result: Result<FetchOutcome, ApiError>) {
        match result {
            Ok(FetchOutcome::Checkout(response)) => {
                info!(
                    bookings = response.booking_ids.len(),
                    status = response.status,
                    "booking completed"
                );
                self.phase = Phase::Done(response);
            }
            Ok(_) => {}
            Err(err) => {
                self.phase = Phase::Failed(err.to_string());
            }
        }
    }

    fn is_input_focused(&self) -> bool {
        matches!(self.phase, Phase::Form)
    }
}
