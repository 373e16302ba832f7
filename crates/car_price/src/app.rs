//! The prediction form as an Elm-style model.
//!
//! [`App::update`] turns a [`Msg`] into state changes plus a [`Cmd`] for the
//! host to run; [`App::view`] renders the current state as styled lines. The
//! app never sleeps or touches the terminal: the busy indicator and the
//! price counter advance one step per [`Msg::Tick`], and the host schedules
//! those ticks as instructed by [`Cmd::Tick`].
//!
//! Phases:
//!
//! ```text
//! Idle ──Predict──▶ Predicting ──ticks──▶ Animating ──ticks──▶ ResultDisplayed
//!   ▲                    │                                        │   │
//!   │                    └──────────error──────▶ Failed           │   │
//!   └────────────── input edited ◀────────────────┴───────────────┘   │
//!                                     Predict ◀─────────────────────────┘
//! ```

use core::time::Duration;
use std::path::PathBuf;
use std::sync::Arc;

use config::Config;
use price_model::{PredictError, PriceModel};
use report::format_amount;
use tracing::{debug, error, info, warn};

use crate::animation::CounterAnimation;
use crate::download::Download;
use crate::session::Session;
use crate::widgets::Field;

/// Shown once the counter has settled.
pub const INSIGHT: [&str; 2] = [
    "Insight: While higher vehicle age usually lowers the price, a more powerful engine or larger max power can compensate.",
    "This prediction reflects the combination of your car's features.",
];

const TITLE: &str = "Car Price Prediction App";
const SUBTITLE: &str = "Fill in the details below to get an estimate of your car's selling price.";
const METRIC_LABEL: &str = "Predicted Selling Price (R)";
const HELP: &str =
    "Tab/Up/Down move  Left/Right adjust  type + Enter to set  p predict  d download  q quit";

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Longest pause between two busy indicator frames.
const BUSY_TICK: Duration = Duration::from_millis(100);

/// Label column width in the form.
const LABEL_WIDTH: usize = 42;

/// Pacing of the busy indicator and the price counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Minimum time "Predicting..." stays on screen.
    pub busy_delay: Duration,
    /// Pause between counter frames.
    pub frame_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            busy_delay: config::DEFAULT_BUSY_DELAY,
            frame_interval: config::DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl From<&Config> for Timing {
    fn from(config: &Config) -> Self {
        Self {
            busy_delay: config.busy_delay,
            frame_interval: config.frame_interval,
        }
    }
}

impl Timing {
    fn busy_tick(&self) -> Duration {
        self.busy_delay.min(BUSY_TICK)
    }

    fn busy_ticks(&self) -> u32 {
        let tick = self.busy_tick().as_nanos();
        if tick == 0 {
            return 1;
        }
        let ticks = self.busy_delay.as_nanos().div_ceil(tick);
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }
}

/// Where the interaction cycle currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Waiting for input; no result shown.
    Idle,
    /// Busy indicator on screen. The model has already answered; the outcome
    /// is applied once the indicator has run its course.
    Predicting {
        ticks_remaining: u32,
        outcome: Result<f64, PredictError>,
    },
    /// Price counter climbing towards the prediction.
    Animating(CounterAnimation),
    /// Final price, insight and download control shown.
    ResultDisplayed,
    /// The model failed; the reason is shown.
    Failed(String),
}

/// The element that receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Predict,
    Download,
}

/// Input to [`App::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    FocusNext,
    FocusPrev,
    /// Step the focused input up.
    Increase,
    /// Step the focused input down.
    Decrease,
    /// A typed character.
    Char(char),
    Backspace,
    /// Enter: commit typed text or press the focused button.
    Submit,
    /// Escape: drop typed text, or quit when nothing is being typed.
    Cancel,
    Predict,
    Download,
    /// Timer tick requested through [`Cmd::Tick`].
    Tick,
    /// The host saved a download at this path.
    Saved(PathBuf),
    /// The host could not save a download.
    SaveFailed(String),
    Quit,
}

/// Side effect requested from the host.
#[derive(Debug, PartialEq)]
pub enum Cmd {
    None,
    Quit,
    /// Deliver [`Msg::Tick`] after this delay.
    Tick(Duration),
    /// Offer this document to the user.
    Download(Download),
}

/// A transient message below the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Visual role of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Title,
    Plain,
    Muted,
    Focused,
    Metric,
    Info,
    Success,
    Error,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub style: Style,
}

impl Line {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), Style::Plain)
    }
}

/// The interactive prediction form.
#[derive(Debug)]
pub struct App {
    model: Arc<PriceModel>,
    session: Session,
    timing: Timing,
    phase: Phase,
    focus: Focus,
    edit: Option<String>,
    status: Option<Status>,
}

impl App {
    /// Creates the form with default inputs.
    #[must_use]
    pub fn new(model: Arc<PriceModel>, timing: Timing) -> Self {
        Self::with_session(model, Session::new(), timing)
    }

    /// Creates the form around an existing session.
    #[must_use]
    pub const fn with_session(model: Arc<PriceModel>, session: Session, timing: Timing) -> Self {
        Self {
            model,
            session,
            timing,
            phase: Phase::Idle,
            focus: Focus::Field(Field::VehicleAge),
            edit: None,
            status: None,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub const fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Whether a prediction is in flight (busy indicator or counter).
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Predicting { .. } | Phase::Animating(_))
    }

    /// Whether the download control is available.
    #[must_use]
    pub const fn can_download(&self) -> bool {
        matches!(self.phase, Phase::ResultDisplayed)
    }

    /// Price currently shown on screen, if any.
    #[must_use]
    pub fn displayed_price(&self) -> Option<f64> {
        match &self.phase {
            Phase::Animating(animation) => Some(animation.displayed()),
            Phase::ResultDisplayed => self.session.prediction(),
            _ => None,
        }
    }

    /// Applies one message and returns the command for the host.
    pub fn update(&mut self, msg: Msg) -> Cmd {
        match msg {
            Msg::Quit => Cmd::Quit,
            Msg::Tick => self.on_tick(),
            Msg::Saved(path) => {
                self.status = Some(Status::Info(format!("Saved {}", path.display())));
                Cmd::None
            }
            Msg::SaveFailed(reason) => {
                self.status = Some(Status::Error(format!("Download failed: {reason}")));
                Cmd::None
            }
            input if self.is_busy() => {
                debug!(?input, "Ignoring input while a prediction is running");
                Cmd::None
            }
            Msg::FocusNext => {
                self.commit_edit();
                self.move_focus(true);
                Cmd::None
            }
            Msg::FocusPrev => {
                self.commit_edit();
                self.move_focus(false);
                Cmd::None
            }
            Msg::Increase => self.step_focused(true),
            Msg::Decrease => self.step_focused(false),
            Msg::Char(c) => self.on_char(c),
            Msg::Backspace => {
                if let Some(text) = &mut self.edit {
                    text.pop();
                }
                Cmd::None
            }
            Msg::Submit => self.on_submit(),
            Msg::Cancel => {
                if self.edit.take().is_some() {
                    Cmd::None
                } else {
                    Cmd::Quit
                }
            }
            Msg::Predict => self.start_prediction(),
            Msg::Download => self.start_download(),
        }
    }

    fn on_char(&mut self, c: char) -> Cmd {
        match (self.focus, c) {
            (Focus::Field(field), '0'..='9' | '.' | '-') if field.is_numeric() => {
                self.edit.get_or_insert_with(String::new).push(c);
                Cmd::None
            }
            (Focus::Field(Field::FuelIsDiesel), ' ') => self.step_focused(true),
            (_, 'p' | 'P') => self.start_prediction(),
            (_, 'd' | 'D') => self.start_download(),
            (_, 'q' | 'Q') => Cmd::Quit,
            _ => Cmd::None,
        }
    }

    fn on_submit(&mut self) -> Cmd {
        match self.focus {
            Focus::Field(Field::FuelIsDiesel) => self.step_focused(true),
            Focus::Field(_) => {
                self.commit_edit();
                Cmd::None
            }
            Focus::Predict => self.start_prediction(),
            Focus::Download => self.start_download(),
        }
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order: Vec<Focus> = Field::ALL.into_iter().map(Focus::Field).collect();
        order.push(Focus::Predict);
        if self.can_download() {
            order.push(Focus::Download);
        }
        order
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    fn step_focused(&mut self, up: bool) -> Cmd {
        self.commit_edit();
        if let Focus::Field(field) = self.focus {
            let before = *self.session.features();
            field.step(self.session.features_mut(), up);
            if *self.session.features() != before {
                self.inputs_changed();
            }
        }
        Cmd::None
    }

    /// Applies typed text to the focused field.
    fn commit_edit(&mut self) {
        let Some(text) = self.edit.take() else {
            return;
        };
        let Focus::Field(field) = self.focus else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        let before = *self.session.features();
        match field.apply_text(self.session.features_mut(), &text) {
            Ok(()) => {
                if *self.session.features() != before {
                    self.inputs_changed();
                }
            }
            Err(err) => {
                warn!(%err, "Rejected typed input");
                self.status = Some(Status::Error(err.to_string()));
            }
        }
    }

    /// A changed input invalidates the shown result.
    fn inputs_changed(&mut self) {
        debug!(features = ?self.session.features(), "Inputs changed");
        self.status = None;
        if matches!(self.phase, Phase::ResultDisplayed | Phase::Failed(_)) {
            self.phase = Phase::Idle;
        }
        if self.focus == Focus::Download {
            self.focus = Focus::Predict;
        }
    }

    fn start_prediction(&mut self) -> Cmd {
        self.commit_edit();
        self.status = None;

        let features = *self.session.features();
        let outcome = self.model.predict(&features);
        info!(?features, ok = outcome.is_ok(), "Prediction requested");

        self.phase = Phase::Predicting {
            ticks_remaining: self.timing.busy_ticks(),
            outcome,
        };
        if self.focus == Focus::Download {
            self.focus = Focus::Predict;
        }
        Cmd::Tick(self.timing.busy_tick())
    }

    fn on_tick(&mut self) -> Cmd {
        match &mut self.phase {
            Phase::Predicting {
                ticks_remaining, ..
            } if *ticks_remaining > 1 => {
                *ticks_remaining -= 1;
                Cmd::Tick(self.timing.busy_tick())
            }
            Phase::Predicting { .. } => self.finish_prediction(),
            Phase::Animating(animation) => {
                if animation.advance().is_some() {
                    return Cmd::Tick(self.timing.frame_interval);
                }
                self.phase = Phase::ResultDisplayed;
                Cmd::None
            }
            // Stale tick from an earlier cycle.
            Phase::Idle | Phase::ResultDisplayed | Phase::Failed(_) => Cmd::None,
        }
    }

    fn finish_prediction(&mut self) -> Cmd {
        let Phase::Predicting { outcome, .. } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return Cmd::None;
        };

        match outcome {
            Ok(price) => {
                self.session.record_prediction(price);
                let mut animation = CounterAnimation::new(price);
                if animation.advance().is_none() {
                    self.phase = Phase::ResultDisplayed;
                    return Cmd::None;
                }
                self.phase = Phase::Animating(animation);
                Cmd::Tick(self.timing.frame_interval)
            }
            Err(err) => {
                error!(%err, "Prediction failed");
                self.phase = Phase::Failed(err.to_string());
                Cmd::None
            }
        }
    }

    fn start_download(&mut self) -> Cmd {
        if !self.can_download() {
            self.status = Some(Status::Error(
                "Run a prediction before downloading the report".to_string(),
            ));
            return Cmd::None;
        }

        match self.session.export_report() {
            Ok(bytes) => Cmd::Download(Download::report(bytes)),
            Err(err) => {
                error!(%err, "Report export failed");
                self.status = Some(Status::Error(format!("Export failed: {err}")));
                Cmd::None
            }
        }
    }

    /// Renders the form.
    #[must_use]
    pub fn view(&self) -> Vec<Line> {
        let mut lines = vec![
            Line::new(TITLE, Style::Title),
            Line::new(SUBTITLE, Style::Muted),
            Line::blank(),
        ];

        for field in Field::ALL {
            let focused = self.focus == Focus::Field(field);
            let value = match &self.edit {
                Some(text) if focused => format!("{text}_"),
                _ => field.display_value(self.session.features()),
            };
            let marker = if focused { '>' } else { ' ' };
            let style = if focused { Style::Focused } else { Style::Plain };
            lines.push(Line::new(
                format!("{marker} {:<LABEL_WIDTH$}{value}", field.label()),
                style,
            ));
        }

        lines.push(Line::blank());
        lines.push(self.button("Predict", Focus::Predict));
        lines.push(Line::blank());

        match &self.phase {
            Phase::Idle => {}
            Phase::Predicting {
                ticks_remaining, ..
            } => {
                let frame = SPINNER[*ticks_remaining as usize % SPINNER.len()];
                lines.push(Line::new(format!("{frame} Predicting..."), Style::Muted));
            }
            Phase::Animating(animation) => push_metric(&mut lines, animation.displayed()),
            Phase::ResultDisplayed => {
                if let Some(price) = self.session.prediction() {
                    push_metric(&mut lines, price);
                }
                lines.push(Line::blank());
                lines.extend(INSIGHT.iter().map(|text| Line::new(*text, Style::Info)));
                lines.push(Line::blank());
                lines.push(self.button("Download Prediction as PDF", Focus::Download));
            }
            Phase::Failed(reason) => {
                lines.push(Line::new(format!("Prediction failed: {reason}"), Style::Error));
            }
        }

        if let Some(status) = &self.status {
            lines.push(Line::blank());
            lines.push(match status {
                Status::Info(text) => Line::new(text.as_str(), Style::Success),
                Status::Error(text) => Line::new(text.as_str(), Style::Error),
            });
        }

        lines.push(Line::blank());
        lines.push(Line::new(HELP, Style::Muted));
        lines
    }

    fn button(&self, label: &str, target: Focus) -> Line {
        if self.focus == target {
            Line::new(format!("> [ {label} ]"), Style::Focused)
        } else {
            Line::new(format!("  [ {label} ]"), Style::Plain)
        }
    }
}

fn push_metric(lines: &mut Vec<Line>, value: f64) {
    lines.push(Line::new(METRIC_LABEL, Style::Plain));
    lines.push(Line::new(format_amount(value), Style::Metric));
}

#[cfg(test)]
mod tests {
    use price_model::LinearRegressor;

    use super::*;

    /// Price = 400000 + 1000 * power - 5000 * age.
    fn app() -> App {
        let model = PriceModel::from(LinearRegressor::new(400_000.0, [-5_000.0, 1_000.0, 0.0, 0.0]));
        App::new(Arc::new(model), Timing::default())
    }

    fn text(app: &App) -> String {
        app.view()
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ticks until the host would stop scheduling.
    fn settle(app: &mut App) -> usize {
        let mut ticks = 0;
        while let Cmd::Tick(_) = app.update(Msg::Tick) {
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_busy_ticks_cover_the_delay() {
        assert_eq!(Timing::default().busy_ticks(), 10);
        assert_eq!(Timing::default().busy_tick(), Duration::from_millis(100));

        let instant = Timing {
            busy_delay: Duration::ZERO,
            frame_interval: Duration::ZERO,
        };
        assert_eq!(instant.busy_ticks(), 1);
    }

    #[test]
    fn test_idle_view() {
        let app = app();
        let screen = text(&app);
        assert!(screen.contains("Vehicle Age (years) [Min: 0, Max: 14]"));
        assert!(screen.contains("(*) No  ( ) Yes"));
        assert!(!screen.contains("Download Prediction as PDF"));
        assert_eq!(app.displayed_price(), None);
    }

    #[test]
    fn test_predict_runs_busy_then_animation() {
        let mut app = app();
        assert_eq!(app.update(Msg::Predict), Cmd::Tick(Duration::from_millis(100)));
        assert!(text(&app).contains("Predicting..."));
        assert_eq!(app.session().prediction(), None);

        for _ in 0..9 {
            assert_eq!(app.update(Msg::Tick), Cmd::Tick(Duration::from_millis(100)));
        }
        assert_eq!(app.update(Msg::Tick), Cmd::Tick(Duration::from_millis(10)));
        assert!(matches!(app.phase(), Phase::Animating(_)));
        assert_eq!(app.session().prediction(), Some(455_000.0));
        assert!(app.displayed_price().unwrap() < 455_000.0);

        settle(&mut app);
        assert_eq!(*app.phase(), Phase::ResultDisplayed);
        assert_eq!(app.displayed_price(), Some(455_000.0));

        let screen = text(&app);
        assert!(screen.contains("455,000.00"));
        assert!(screen.contains(INSIGHT[0]));
        assert!(screen.contains("Download Prediction as PDF"));
    }

    #[test]
    fn test_input_ignored_while_busy() {
        let mut app = app();
        app.update(Msg::Predict);
        assert_eq!(app.update(Msg::Increase), Cmd::None);
        assert_eq!(app.update(Msg::Download), Cmd::None);
        assert_eq!(app.session().features().vehicle_age(), 5);
        assert_eq!(app.update(Msg::Quit), Cmd::Quit);
    }

    #[test]
    fn test_download_gated_until_result() {
        let mut app = app();
        assert_eq!(app.update(Msg::Download), Cmd::None);
        assert!(matches!(app.status(), Some(Status::Error(_))));

        app.update(Msg::Predict);
        settle(&mut app);
        let Cmd::Download(download) = app.update(Msg::Download) else {
            panic!("expected a download");
        };
        assert_eq!(download.file_name, "car_price_prediction.pdf");
        assert_eq!(download.mime_type, "application/pdf");
        assert!(download.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_editing_after_result_returns_to_idle() {
        let mut app = app();
        app.update(Msg::Predict);
        settle(&mut app);

        app.update(Msg::Increase);
        assert_eq!(*app.phase(), Phase::Idle);
        assert_eq!(app.session().features().vehicle_age(), 6);
        // The last prediction stays in the session.
        assert_eq!(app.session().prediction(), Some(455_000.0));
        assert!(!text(&app).contains("Download Prediction as PDF"));
    }

    #[test]
    fn test_typed_value_is_clamped() {
        let mut app = app();
        for c in "20".chars() {
            app.update(Msg::Char(c));
        }
        assert!(text(&app).contains("20_"));
        app.update(Msg::Submit);
        assert_eq!(app.session().features().vehicle_age(), 14);

        app.update(Msg::FocusNext);
        app.update(Msg::FocusNext);
        for c in "-1".chars() {
            app.update(Msg::Char(c));
        }
        app.update(Msg::FocusNext);
        assert_eq!(app.session().features().engine_size(), 500);
    }

    #[test]
    fn test_huge_typed_value_is_clamped() {
        let mut app = app();
        for c in "99999999999999999999".chars() {
            app.update(Msg::Char(c));
        }
        app.update(Msg::Submit);
        assert_eq!(app.session().features().vehicle_age(), 14);
        assert_eq!(app.status(), None);
    }

    #[test]
    fn test_bad_text_reports_error() {
        let mut app = app();
        app.update(Msg::Char('.'));
        app.update(Msg::Submit);
        assert!(matches!(app.status(), Some(Status::Error(_))));
        assert_eq!(app.session().features().vehicle_age(), 5);
    }

    #[test]
    fn test_cancel_drops_edit_then_quits() {
        let mut app = app();
        app.update(Msg::Char('9'));
        assert_eq!(app.update(Msg::Cancel), Cmd::None);
        assert_eq!(app.session().features().vehicle_age(), 5);
        assert_eq!(app.update(Msg::Cancel), Cmd::Quit);
    }

    #[test]
    fn test_focus_cycles_and_skips_hidden_download() {
        let mut app = app();
        for _ in 0..5 {
            app.update(Msg::FocusNext);
        }
        assert_eq!(app.focus(), Focus::Field(Field::VehicleAge));

        app.update(Msg::FocusPrev);
        assert_eq!(app.focus(), Focus::Predict);
        assert!(matches!(app.update(Msg::Submit), Cmd::Tick(_)));
        settle(&mut app);

        app.update(Msg::FocusNext);
        assert_eq!(app.focus(), Focus::Download);
        assert!(matches!(app.update(Msg::Submit), Cmd::Download(_)));
    }

    #[test]
    fn test_fuel_toggle() {
        let mut app = app();
        for _ in 0..3 {
            app.update(Msg::FocusNext);
        }
        assert_eq!(app.focus(), Focus::Field(Field::FuelIsDiesel));
        app.update(Msg::Char(' '));
        assert!(app.session().features().fuel_is_diesel());
        app.update(Msg::Submit);
        assert!(!app.session().features().fuel_is_diesel());
    }

    #[test]
    fn test_failed_prediction_keeps_session() {
        let model = PriceModel::from(LinearRegressor::new(f64::MAX, [f64::MAX; 4]));
        let mut session = Session::new();
        session.record_prediction(123.0);
        let mut app = App::with_session(Arc::new(model), session, Timing::default());

        app.update(Msg::Predict);
        settle(&mut app);

        assert!(matches!(app.phase(), Phase::Failed(_)));
        assert_eq!(app.session().prediction(), Some(123.0));
        assert!(text(&app).contains("Prediction failed"));
        assert!(!app.can_download());
    }

    #[test]
    fn test_save_messages_set_status() {
        let mut app = app();
        app.update(Msg::Saved(PathBuf::from("out/car_price_prediction.pdf")));
        assert_eq!(
            app.status(),
            Some(&Status::Info("Saved out/car_price_prediction.pdf".to_string()))
        );
        app.update(Msg::SaveFailed("disk full".to_string()));
        assert_eq!(
            app.status(),
            Some(&Status::Error("Download failed: disk full".to_string()))
        );
    }
}
