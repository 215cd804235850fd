use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mortgage_calculator::{
    config::Settings,
    engine::{self, ScheduleRow},
    form::LoanForm,
    input::Field,
    report::{self, Report},
};
use ratatui::widgets::TableState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Currency,
    LoanSeeking,
    DownPayment,
    InterestRate,
    PrincipalPayment,
    ExtraPayment,
    MonthlyFee,
    Results,
    Schedule,
}

impl Screen {
    pub fn field(self) -> Option<Field> {
        match self {
            Screen::LoanSeeking => Some(Field::LoanSeekingAmount),
            Screen::DownPayment => Some(Field::DownPayment),
            Screen::InterestRate => Some(Field::InterestRate),
            Screen::PrincipalPayment => Some(Field::PrincipalPayment),
            Screen::ExtraPayment => Some(Field::ExtraPayment),
            Screen::MonthlyFee => Some(Field::MonthlyFee),
            Screen::Currency | Screen::Results | Screen::Schedule => None,
        }
    }

    pub fn for_field(field: Field) -> Screen {
        match field {
            Field::LoanSeekingAmount => Screen::LoanSeeking,
            Field::DownPayment => Screen::DownPayment,
            Field::InterestRate => Screen::InterestRate,
            Field::PrincipalPayment => Screen::PrincipalPayment,
            Field::ExtraPayment => Screen::ExtraPayment,
            Field::MonthlyFee => Screen::MonthlyFee,
        }
    }

    fn next(self) -> Screen {
        match self {
            Screen::Currency => Screen::LoanSeeking,
            Screen::LoanSeeking => Screen::DownPayment,
            Screen::DownPayment => Screen::InterestRate,
            Screen::InterestRate => Screen::PrincipalPayment,
            Screen::PrincipalPayment => Screen::ExtraPayment,
            Screen::ExtraPayment => Screen::MonthlyFee,
            Screen::MonthlyFee | Screen::Results | Screen::Schedule => Screen::Results,
        }
    }

    fn previous(self) -> Screen {
        match self {
            Screen::Currency | Screen::LoanSeeking => Screen::Currency,
            Screen::DownPayment => Screen::LoanSeeking,
            Screen::InterestRate => Screen::DownPayment,
            Screen::PrincipalPayment => Screen::InterestRate,
            Screen::ExtraPayment => Screen::PrincipalPayment,
            Screen::MonthlyFee => Screen::ExtraPayment,
            Screen::Results => Screen::MonthlyFee,
            Screen::Schedule => Screen::Results,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub screen: Screen,
    pub form: LoanForm,
    pub settings: Settings,
    pub status: Option<StatusMessage>,
    pub schedule: Vec<ScheduleRow>,
    pub table_state: TableState,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            screen: Screen::Currency,
            form: LoanForm::new(&settings),
            settings,
            status: None,
            schedule: Vec::new(),
            table_state: TableState::default(),
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    fn calculate(&mut self) {
        match self.form.calculate() {
            Ok(_) => {
                self.screen = Screen::Results;
            }
            Err(err) => {
                tracing::warn!(error = %err, "calculation rejected");
                if let Some(field) = err.field() {
                    self.screen = Screen::for_field(field);
                }
                self.error(err.to_string());
            }
        }
    }

    fn open_schedule(&mut self) {
        let Some(calculation) = self.form.calculation() else {
            self.error("Nothing to show yet");
            return;
        };
        self.schedule = engine::schedule(&calculation.input, &calculation.result);
        if self.schedule.is_empty() {
            self.info("Paid off before the first month");
            return;
        }
        self.table_state.select(Some(0));
        self.screen = Screen::Schedule;
    }

    fn select_row(&mut self, row: usize) {
        let last = self.schedule.len().saturating_sub(1);
        self.table_state.select(Some(row.min(last)));
    }

    fn export(&mut self) {
        let Some(calculation) = self.form.calculation() else {
            self.error("Nothing to export yet");
            return;
        };
        let report = Report::new(
            &calculation.input,
            &calculation.result,
            Local::now().naive_local(),
        );
        match report::export(
            &report,
            &self.settings.output_dir,
            self.settings.report_format,
        ) {
            Ok(path) => self.info(format!("Report exported to {}", path.display())),
            Err(err) => {
                tracing::error!(error = %err, "report export failed");
                self.error(format!("Failed to export report: {}", err));
            }
        }
    }
}

/// Applies one key press. Returns `true` when the user asked to quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    app.status = None;

    match app.screen {
        Screen::Currency => handle_currency_input(app, key),
        Screen::Results => handle_results_input(app, key),
        Screen::Schedule => handle_schedule_input(app, key),
        screen => match screen.field() {
            Some(field) => {
                handle_field_input(app, key, field);
                false
            }
            None => false,
        },
    }
}

fn handle_currency_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            let next = app.form.currency().next();
            app.form.set_currency(next);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let previous = app.form.currency().previous();
            app.form.set_currency(previous);
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            app.screen = Screen::LoanSeeking;
        }
        KeyCode::Esc | KeyCode::Char('q') => return true,
        _ => {}
    }
    false
}

fn handle_field_input(app: &mut App, key: KeyEvent, field: Field) {
    match key.code {
        KeyCode::Tab if field == Field::DownPayment => {
            app.form.toggle_down_payment_mode();
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ',' => {
            if app.form.is_editable(field) {
                app.form.push_char(field, c);
            } else {
                app.info("Press Tab to switch to manual down payment");
            }
        }
        KeyCode::Backspace => {
            app.form.pop_char(field);
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            if field == Field::LoanSeekingAmount && app.form.text(field).is_empty() {
                app.error("Enter the amount you are seeking to borrow");
            } else if field == Field::MonthlyFee {
                app.calculate();
            } else {
                app.screen = app.screen.next();
            }
        }
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => {
            app.screen = app.screen.previous();
        }
        _ => {}
    }
}

fn handle_results_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Char('e') | KeyCode::Char('E') => app.export(),
        KeyCode::Char('c') | KeyCode::Char('C') => {
            app.form.clear();
            app.screen = Screen::LoanSeeking;
            app.info("Fields cleared");
        }
        KeyCode::Char('r') | KeyCode::Char('R') => app.calculate(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.open_schedule(),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => {
            app.screen = Screen::MonthlyFee;
        }
        _ => {}
    }
    false
}

fn handle_schedule_input(app: &mut App, key: KeyEvent) -> bool {
    let current = app.table_state.selected().unwrap_or(0);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Down | KeyCode::Char('j') => app.select_row(current + 1),
        KeyCode::Up | KeyCode::Char('k') => app.select_row(current.saturating_sub(1)),
        KeyCode::PageDown => app.select_row(current + 10),
        KeyCode::Char('d') if ctrl => app.select_row(current + 10),
        KeyCode::PageUp => app.select_row(current.saturating_sub(10)),
        KeyCode::Char('u') if ctrl => app.select_row(current.saturating_sub(10)),
        KeyCode::Char('g') | KeyCode::Home => app.select_row(0),
        KeyCode::Char('G') | KeyCode::End => app.select_row(usize::MAX),
        KeyCode::Char('e') | KeyCode::Char('E') => app.export(),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => {
            app.screen = Screen::Results;
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use mortgage_calculator::report::ReportFormat;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app_in(dir: &std::path::Path) -> App {
        App::new(Settings {
            output_dir: dir.to_path_buf(),
            report_format: ReportFormat::Text,
            ..Settings::default()
        })
    }

    fn fill_scenario(app: &mut App) {
        press(app, KeyCode::Enter);
        type_text(app, "300000");
        press(app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::DownPayment);
        press(app, KeyCode::Enter);
        press(app, KeyCode::Enter);
        type_text(app, "500");
        press(app, KeyCode::Enter);
        type_text(app, "300");
        press(app, KeyCode::Enter);
        type_text(app, "200");
        press(app, KeyCode::Enter);
    }

    #[test]
    fn walks_through_the_form_to_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        fill_scenario(&mut app);

        assert_eq!(app.screen, Screen::Results);
        let calculation = app.form.calculation().unwrap();
        assert_eq!(calculation.result.months_to_payoff_with_extra, 318);
        assert_eq!(calculation.result.months_saved, 192);
    }

    #[test]
    fn rejected_input_returns_to_the_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "300000");
        // skip principal payment entirely
        for _ in 0..6 {
            press(&mut app, KeyCode::Enter);
        }
        assert_eq!(app.screen, Screen::PrincipalPayment);
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("Principal payment"));
    }

    #[test]
    fn loan_seeking_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::LoanSeeking);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn tab_switches_down_payment_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "100000");
        press(&mut app, KeyCode::Enter);

        type_text(&mut app, "9");
        assert_eq!(app.form.text(Field::DownPayment), "15,000");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "999");
        assert_eq!(app.form.text(Field::DownPayment), "15,999");
    }

    #[test]
    fn exports_twice_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        fill_scenario(&mut app);

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('e'));
        assert!(!app.status.as_ref().unwrap().is_error);

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with(".txt"));
        assert!(names[1].ends_with("_1.txt"));
    }

    #[test]
    fn browses_the_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        fill_scenario(&mut app);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.screen, Screen::Schedule);
        assert_eq!(app.schedule.len(), 318);
        assert_eq!(app.table_state.selected(), Some(0));

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.table_state.selected(), Some(11));
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        assert_eq!(app.table_state.selected(), Some(1));
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.table_state.selected(), Some(0));
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.table_state.selected(), Some(317));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.table_state.selected(), Some(317));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Results);
    }

    #[test]
    fn clear_and_quit_from_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        fill_scenario(&mut app);

        assert!(!press(&mut app, KeyCode::Char('c')));
        assert_eq!(app.screen, Screen::LoanSeeking);
        assert!(app.form.calculation().is_none());
        assert_eq!(app.form.text(Field::LoanSeekingAmount), "");

        assert!(handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
    }
}
