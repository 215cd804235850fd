use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mortgage_calculator::{
    config::Settings,
    currency::Currency,
    form::{DownPaymentMode, LoanForm},
    input::Field,
    logging::{self, LogTarget},
    report::{self, Report, ReportFormat},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

mod app;
mod ui;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "mortgage-calculator", version, about = "Mortgage payment calculator")]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory exported reports are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Report format: pdf, text or json
    #[arg(long, global = true)]
    format: Option<ReportFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute once from the given fields and print the report
    Calc(CalcArgs),
}

#[derive(Args, Debug)]
struct CalcArgs {
    #[arg(long, allow_hyphen_values = true)]
    loan_seeking: String,

    /// Defaults to the auto down payment percentage of the loan seeking amount
    #[arg(long, allow_hyphen_values = true)]
    down_payment: Option<String>,

    /// Annual interest rate in percent
    #[arg(long, allow_hyphen_values = true)]
    interest_rate: Option<String>,

    /// Monthly principal payment
    #[arg(long, allow_hyphen_values = true)]
    principal: String,

    /// Monthly extra payment
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    extra: String,

    /// Monthly house fee
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    fee: String,

    #[arg(long)]
    currency: Option<Currency>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Also write the report to the output directory
    #[arg(long)]
    export: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(output_dir) = cli.output_dir {
        settings.output_dir = output_dir;
    }
    if let Some(format) = cli.format {
        settings.report_format = format;
    }

    match cli.command {
        Some(Command::Calc(args)) => {
            logging::init(LogTarget::Stderr)?;
            run_calc(&settings, args)
        }
        None => {
            logging::init(LogTarget::File(&settings.log_path()))
                .context("Failed to open log file")?;
            run_tui(settings)
        }
    }
}

fn fill_form(settings: &Settings, args: &CalcArgs) -> LoanForm {
    let mut form = LoanForm::new(settings);
    if let Some(currency) = args.currency {
        form.set_currency(currency);
    }
    if args.down_payment.is_some() {
        form.set_down_payment_mode(DownPaymentMode::Manual);
    }

    form.set_text(Field::LoanSeekingAmount, &args.loan_seeking);
    if let Some(down_payment) = &args.down_payment {
        form.set_text(Field::DownPayment, down_payment);
    }
    if let Some(rate) = &args.interest_rate {
        form.set_text(Field::InterestRate, rate);
    }
    form.set_text(Field::PrincipalPayment, &args.principal);
    form.set_text(Field::ExtraPayment, &args.extra);
    form.set_text(Field::MonthlyFee, &args.fee);
    form
}

fn run_calc(settings: &Settings, args: CalcArgs) -> Result<()> {
    let mut form = fill_form(settings, &args);
    let calculation = form.calculate()?;
    let report = Report::new(
        &calculation.input,
        &calculation.result,
        Local::now().naive_local(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }

    if args.export {
        let path = report::export(&report, &settings.output_dir, settings.report_format)?;
        println!("Report exported to {}", path.display());
    }
    Ok(())
}

fn run_tui(settings: Settings) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(settings);
    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal session failed");
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    tracing::info!(output_dir = %app.settings.output_dir.display(), "session started");
    loop {
        terminal.draw(|f| ui::ui(f, &mut app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app::handle_key(&mut app, key) {
                tracing::info!("session ended");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc_args(extra: &[&str]) -> CalcArgs {
        let mut argv = vec![
            "mortgage-calculator",
            "calc",
            "--loan-seeking",
            "300,000",
            "--principal",
            "500",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Command::Calc(args)) => args,
            None => panic!("calc subcommand not parsed"),
        }
    }

    #[test]
    fn calc_defaults_to_auto_down_payment() {
        let form = fill_form(&Settings::default(), &calc_args(&[]));
        assert_eq!(form.down_payment_mode(), DownPaymentMode::Auto);
        assert_eq!(form.text(Field::DownPayment), "45,000");
        assert_eq!(form.text(Field::InterestRate), "4.5");
        assert_eq!(form.loan_amount_preview(), Some(255_000.0));
    }

    #[test]
    fn explicit_down_payment_switches_to_manual() {
        let args = calc_args(&[
            "--down-payment",
            "60000",
            "--interest-rate",
            "3.25",
            "--extra",
            "300",
            "--currency",
            "USD",
        ]);
        let mut form = fill_form(&Settings::default(), &args);
        assert_eq!(form.down_payment_mode(), DownPaymentMode::Manual);
        assert_eq!(form.text(Field::DownPayment), "60000");
        assert_eq!(form.currency(), Currency::Usd);

        let calculation = form.calculate().unwrap();
        assert_eq!(calculation.result.loan_amount, 240_000.0);
        assert_eq!(calculation.input.annual_interest_rate_percent, 3.25);
        assert_eq!(calculation.result.total_principal_payment, 800.0);
    }

    #[test]
    fn negative_amounts_reach_validation() {
        let args = calc_args(&["--fee", "-5"]);
        let mut form = fill_form(&Settings::default(), &args);
        assert!(form.calculate().is_err());
    }
}
