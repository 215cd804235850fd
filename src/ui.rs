use mortgage_calculator::{
    currency::Currency,
    engine::ScheduleRow,
    form::{Calculation, DownPaymentMode},
    format::{format_grouped, format_money, format_rate},
    input::Field,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Screen};

pub fn ui(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Currency => render_currency_screen(f, app),
        Screen::DownPayment => render_down_payment_screen(f, app),
        Screen::Results => render_results_screen(f, app),
        Screen::Schedule => render_schedule_screen(f, app),
        screen => {
            if let Some(field) = screen.field() {
                render_field_screen(f, app, field);
            }
        }
    }
}

// title, body, status line, help
fn frame_chunks(f: &Frame, body_height: u16) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(body_height),
                Constraint::Length(2),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(f.size())
        .to_vec()
}

fn render_title(f: &mut Frame, area: Rect, title: &str) {
    let title = Paragraph::new(title.to_string())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    if let Some(status) = &app.status {
        let color = if status.is_error {
            Color::Red
        } else {
            Color::Green
        };
        let status = Paragraph::new(status.text.clone())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center);
        f.render_widget(status, area);
    }
}

fn render_help(f: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, area);
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_currency_screen(f: &mut Frame, app: &App) {
    let chunks = frame_chunks(f, Currency::ALL.len() as u16 + 2);
    render_title(f, chunks[0], "Mortgage Calculator");

    let current = app.form.currency();
    let lines: Vec<Line> = Currency::ALL
        .iter()
        .map(|currency| {
            let marker = if *currency == current { "▶" } else { " " };
            Line::from(format!("{} {:<3} {}", marker, currency.symbol(), currency.name()))
                .style(selected_style(*currency == current))
        })
        .collect();

    let input = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Select Currency"));
    f.render_widget(input, chunks[1]);

    render_status(f, app, chunks[2]);
    render_help(f, chunks[3], "j/k or ↑/↓: choose | Enter/l/→: continue | Esc/q: exit");
}

fn prompt(field: Field) -> &'static str {
    match field {
        Field::LoanSeekingAmount => "How much are you seeking to borrow for?",
        Field::DownPayment => "Down Payment - Press Tab to switch between options",
        Field::InterestRate => "What is your annual interest rate? (%)",
        Field::PrincipalPayment => "Monthly principal payment",
        Field::ExtraPayment => "Extra monthly payment (optional)",
        Field::MonthlyFee => "Monthly house fee (optional)",
    }
}

fn field_value(app: &App, field: Field) -> String {
    let text = app.form.text(field);
    match field {
        Field::InterestRate => format!("{}%", text),
        _ => format!("{}{}", app.form.currency().symbol(), text),
    }
}

fn loan_amount_line(app: &App) -> Line<'static> {
    let amount = app
        .form
        .loan_amount_preview()
        .map(|amount| format_money(app.form.currency(), amount))
        .unwrap_or_else(|| "-".to_string());
    Line::from(vec![
        Span::styled("Loan Amount: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(amount, Style::default().fg(Color::Cyan)),
    ])
}

fn render_field_screen(f: &mut Frame, app: &App, field: Field) {
    let chunks = frame_chunks(f, 5);
    render_title(f, chunks[0], "Mortgage Calculator");

    let mut lines = vec![Line::from(field_value(app, field))
        .style(Style::default().fg(Color::Yellow))];
    if field == Field::LoanSeekingAmount {
        lines.push(Line::from(""));
        lines.push(loan_amount_line(app));
    }

    let input = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(prompt(field)));
    f.render_widget(input, chunks[1]);

    render_status(f, app, chunks[2]);
    let help = if field == Field::MonthlyFee {
        "Enter/l/→: calculate | Esc/h/←: back"
    } else {
        "Enter/l/→: continue | Esc/h/←: back"
    };
    render_help(f, chunks[3], help);
}

fn render_down_payment_screen(f: &mut Frame, app: &App) {
    let chunks = frame_chunks(f, 8);
    render_title(f, chunks[0], "Mortgage Calculator");

    let auto = app.form.down_payment_mode() == DownPaymentMode::Auto;
    let percent = format_grouped(app.settings.auto_down_payment_percent);
    let value = field_value(app, Field::DownPayment);

    let auto_option = if auto {
        format!("▶ Auto ({}%): {}", percent, value)
    } else {
        format!("  Auto ({}%)", percent)
    };
    let manual_option = if !auto {
        format!("▶ Manual: {}", value)
    } else {
        "  Manual".to_string()
    };

    let lines = vec![
        Line::from(auto_option).style(selected_style(auto)),
        Line::from(manual_option).style(selected_style(!auto)),
        Line::from(""),
        loan_amount_line(app),
    ];

    let input = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(prompt(Field::DownPayment)),
    );
    f.render_widget(input, chunks[1]);

    render_status(f, app, chunks[2]);
    render_help(
        f,
        chunks[3],
        "Tab: toggle auto/manual | Enter/l/→: continue | Esc/h/←: back",
    );
}

fn result_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
    ))
}

fn result_lines(calculation: &Calculation) -> Vec<Line<'static>> {
    let input = &calculation.input;
    let result = &calculation.result;
    let money = |value: f64| format_money(input.currency, value);

    vec![
        result_line(
            "Monthly Payment (incl. fees)",
            money(result.total_monthly_payment),
            Color::Yellow,
        ),
        result_line(
            "Total Interest",
            money(result.base_total_interest_over_term),
            Color::Red,
        ),
        Line::from(""),
        section_title("Loan Details"),
        result_line("Loan Seeking For", money(input.loan_seeking_amount), Color::White),
        result_line("Down Payment", money(input.down_payment), Color::White),
        result_line("Loan Amount", money(result.loan_amount), Color::White),
        result_line(
            "Interest Rate",
            format_rate(input.annual_interest_rate_percent),
            Color::White,
        ),
        Line::from(""),
        section_title("Monthly Payment Breakdown"),
        result_line("Principal Payment", money(input.monthly_principal_payment), Color::Green),
        result_line("Extra Payment", money(input.monthly_extra_payment), Color::Green),
        result_line("Total Principal", money(result.total_principal_payment), Color::Green),
        result_line("Interest Payment", money(result.monthly_interest), Color::Red),
        result_line("Monthly House Fee", money(input.monthly_fee), Color::Yellow),
        result_line(
            "Total Monthly Payment",
            money(result.total_monthly_payment),
            Color::Yellow,
        ),
        Line::from(""),
        section_title("With Extra Payments"),
        result_line("Time Saved", result.time_saved_span().to_string(), Color::Magenta),
        result_line("Interest Saved", money(result.interest_saved), Color::Magenta),
        result_line("Loan Payoff Time", result.payoff_span().to_string(), Color::Magenta),
    ]
}

fn render_results_screen(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(2),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    render_title(f, chunks[0], "Mortgage Results");

    let lines = match app.form.calculation() {
        Some(calculation) => result_lines(calculation),
        None => vec![Line::from("No results yet. Press r to calculate.")],
    };
    let title = format!("Results ({})", app.form.currency().name());
    let results = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Left);
    f.render_widget(results, chunks[1]);

    render_status(f, app, chunks[2]);

    let help = Paragraph::new(format!(
        "s: schedule | e: export {} | r: recalculate | c: clear | h/←: back | q: quit",
        app.settings.report_format
    ))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[3]);
}

fn schedule_row(row: &ScheduleRow, money: impl Fn(f64) -> String) -> Row<'static> {
    Row::new(vec![
        Cell::from(row.month.to_string()),
        Cell::from(money(row.payment)),
        Cell::from(money(row.principal)),
        Cell::from(money(row.extra)),
        Cell::from(money(row.interest)),
        Cell::from(money(row.remaining_balance)),
    ])
    .height(1)
}

fn render_schedule_screen(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.size());

    let currency = app.form.currency();
    let header = Row::new(vec![
        "Month",
        "Payment",
        "Principal",
        "Extra",
        "Interest",
        "Balance",
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    .height(1);
    let rows = app
        .schedule
        .iter()
        .map(|row| schedule_row(row, |value| format_money(currency, value)));
    let widths = [
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Amortization Schedule"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");
    f.render_stateful_widget(table, chunks[0], &mut app.table_state);

    let help = Paragraph::new(
        "j/k or ↑/↓: navigate | Ctrl+d/u: page | g/G: top/bottom | e: export | h/←: back | q: quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use mortgage_calculator::config::Settings;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::app::handle_key;

    fn screen_text(app: &mut App) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_currency_choices() {
        let mut app = App::new(Settings::default());
        let text = screen_text(&mut app);
        assert!(text.contains("Select Currency"));
        assert!(text.contains("Swedish Krona (SEK)"));
        assert!(text.contains("British Pound (GBP)"));
    }

    #[test]
    fn renders_results_panel() {
        let mut app = App::new(Settings::default());
        app.form.set_text(Field::LoanSeekingAmount, "300000");
        app.form.set_text(Field::PrincipalPayment, "500");
        app.form.set_text(Field::ExtraPayment, "300");
        app.form.set_text(Field::MonthlyFee, "200");
        app.form.calculate().unwrap();
        app.screen = Screen::Results;

        let text = screen_text(&mut app);
        assert!(text.contains("Total Monthly Payment: kr1,956"));
        assert!(text.contains("Time Saved: 16 years, 0 months"));
        assert!(text.contains("Loan Payoff Time: 26 years, 6 months"));
    }

    #[test]
    fn shows_loan_amount_while_typing() {
        let mut app = App::new(Settings::default());
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        for c in "200000".chars() {
            handle_key(&mut app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        let text = screen_text(&mut app);
        assert!(text.contains("kr200000"));
        assert!(text.contains("Loan Amount: kr170,000"));
    }

    #[test]
    fn renders_schedule_table() {
        let mut app = App::new(Settings::default());
        app.form.set_text(Field::LoanSeekingAmount, "300000");
        app.form.set_text(Field::PrincipalPayment, "500");
        app.form.set_text(Field::ExtraPayment, "300");
        app.form.calculate().unwrap();
        app.screen = Screen::Results;
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        assert_eq!(app.screen, Screen::Schedule);

        let text = screen_text(&mut app);
        assert!(text.contains("Amortization Schedule"));
        assert!(text.contains("Balance"));
        assert!(text.contains("kr1,756"));
        assert!(text.contains("kr254,200"));
    }
}
