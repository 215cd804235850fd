pub mod pdf;

use std::{
    fmt, fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{schedule, MortgageResult, ScheduleRow},
    error::{Error, Result},
    format::{format_grouped, format_money, format_rate},
    input::LoanInput,
};

use self::pdf::{Font, PdfDocument, PAGE_HEIGHT, PAGE_WIDTH};

pub const REPORT_TITLE: &str = "Mortgage Calculator Results";

const MARGIN: f32 = 50.0;
const ENTRY_INDENT: f32 = 70.0;
const LINE_STEP: f32 = 20.0;
const SECTION_GAP: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(Error::Config(format!("unknown report format '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub label: String,
    pub value: String,
}

impl Entry {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub input: LoanInput,
    pub result: MortgageResult,
    pub sections: Vec<Section>,
    pub schedule: Vec<ScheduleRow>,
}

impl Report {
    pub fn new(input: &LoanInput, result: &MortgageResult, generated_at: NaiveDateTime) -> Self {
        let money = |value: f64| format_money(input.currency, value);

        let sections = vec![
            Section {
                title: "Loan Details".to_string(),
                entries: vec![
                    Entry::new("Loan Seeking For", money(input.loan_seeking_amount)),
                    Entry::new("Down Payment", money(input.down_payment)),
                    Entry::new("Loan Amount", money(result.loan_amount)),
                    Entry::new(
                        "Interest Rate",
                        format_rate(input.annual_interest_rate_percent),
                    ),
                ],
            },
            Section {
                title: "Monthly Payment Breakdown".to_string(),
                entries: vec![
                    Entry::new("Principal Payment", money(input.monthly_principal_payment)),
                    Entry::new("Extra Payment", money(input.monthly_extra_payment)),
                    Entry::new("Total Principal", money(result.total_principal_payment)),
                    Entry::new("Interest Payment", money(result.monthly_interest)),
                    Entry::new("Monthly House Fee", money(input.monthly_fee)),
                    Entry::new("Total Monthly Payment", money(result.total_monthly_payment)),
                ],
            },
            Section {
                title: "With Extra Payments".to_string(),
                entries: vec![
                    Entry::new("Time Saved", result.time_saved_span().to_string()),
                    Entry::new("Interest Saved", money(result.interest_saved)),
                    Entry::new("Loan Payoff Time", result.payoff_span().to_string()),
                ],
            },
        ];

        Self {
            title: REPORT_TITLE.to_string(),
            generated_at,
            input: *input,
            result: result.clone(),
            sections,
            schedule: schedule(input, result),
        }
    }

    fn generated_line(&self) -> String {
        format!(
            "Generated on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.generated_line());
        out.push('\n');
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            for entry in &section.entries {
                out.push_str(&format!("  {}: {}\n", entry.label, entry.value));
            }
        }
        self.write_schedule(&mut out);
        out
    }

    fn write_schedule(&self, out: &mut String) {
        if self.schedule.is_empty() {
            return;
        }
        let money = |value: f64| format_money(self.input.currency, value);

        out.push_str("\nAmortization Schedule\n");
        out.push_str(&format!(
            "  {:>5}  {:>14}  {:>14}  {:>14}  {:>14}  {:>16}\n",
            "Month", "Payment", "Principal", "Extra", "Interest", "Balance"
        ));
        for row in &self.schedule {
            out.push_str(&format!(
                "  {:>5}  {:>14}  {:>14}  {:>14}  {:>14}  {:>16}\n",
                row.month,
                money(row.payment),
                money(row.principal),
                money(row.extra),
                money(row.interest),
                money(row.remaining_balance),
            ));
        }
        let total = self.result.months_to_payoff_with_extra;
        if (self.schedule.len() as u64) < total {
            out.push_str(&format!(
                "  First {} of {} months shown\n",
                format_grouped(self.schedule.len() as f64),
                format_grouped(total as f64)
            ));
        }
    }

    pub fn to_pdf(&self) -> Vec<u8> {
        let mut doc = PdfDocument::new();
        let top = PAGE_HEIGHT - MARGIN;

        doc.text(Font::Bold, 16.0, MARGIN, top, &self.title);
        doc.line(MARGIN, top - 10.0, PAGE_WIDTH - MARGIN, top - 10.0);
        doc.text(Font::Regular, 10.0, MARGIN, top - 30.0, &self.generated_line());

        let mut y = top - 50.0 + SECTION_GAP;
        for section in &self.sections {
            advance(&mut doc, &mut y, SECTION_GAP);
            doc.text(Font::Bold, 12.0, MARGIN, y, &section.title);
            y -= LINE_STEP;
            for entry in &section.entries {
                advance(&mut doc, &mut y, LINE_STEP);
                let line = format!("{}: {}", entry.label, entry.value);
                doc.text(Font::Regular, 10.0, ENTRY_INDENT, y, &line);
            }
        }
        doc.to_bytes()
    }

    pub fn render(&self, format: ReportFormat) -> Result<Vec<u8>> {
        let bytes = match format {
            ReportFormat::Pdf => self.to_pdf(),
            ReportFormat::Text => self.to_text().into_bytes(),
            ReportFormat::Json => {
                serde_json::to_vec_pretty(self).map_err(std::io::Error::from)?
            }
        };
        Ok(bytes)
    }
}

fn advance(doc: &mut PdfDocument, y: &mut f32, step: f32) {
    *y -= step;
    if *y < MARGIN {
        doc.new_page();
        *y = PAGE_HEIGHT - MARGIN;
    }
}

pub fn base_filename(date: NaiveDate) -> String {
    format!("mortgage_calculation_{}", date.format("%d-%m-%Y"))
}

fn candidate_path(dir: &Path, base: &str, attempt: u32, format: ReportFormat) -> PathBuf {
    let name = if attempt == 0 {
        format!("{}.{}", base, format.extension())
    } else {
        format!("{}_{}.{}", base, attempt, format.extension())
    };
    dir.join(name)
}

/// Writes `report` into `dir` and returns the path of the new file. Later
/// exports on the same day get `_1`, `_2`, ... and never overwrite an
/// earlier one.
pub fn export(report: &Report, dir: &Path, format: ReportFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let bytes = report.render(format)?;
    let base = base_filename(report.generated_at.date());

    for attempt in 0u32.. {
        let path = candidate_path(dir, &base, attempt, format);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                file.write_all(&bytes)?;
                tracing::info!(path = %path.display(), %format, "exported report");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "report name taken");
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }

    Err(Error::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "no free report file name",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{currency::Currency, engine::compute};

    fn report(extra: f64) -> Report {
        let input = LoanInput {
            loan_seeking_amount: 300_000.0,
            down_payment: 45_000.0,
            annual_interest_rate_percent: 4.5,
            monthly_principal_payment: 500.0,
            monthly_extra_payment: extra,
            monthly_fee: 200.0,
            currency: Currency::Sek,
        };
        let result = compute(&input).unwrap();
        let generated_at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        Report::new(&input, &result, generated_at)
    }

    #[test]
    fn filename_uses_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(base_filename(date), "mortgage_calculation_07-03-2024");
        let dir = Path::new("out");
        assert_eq!(
            candidate_path(dir, "base", 0, ReportFormat::Pdf),
            dir.join("base.pdf")
        );
        assert_eq!(
            candidate_path(dir, "base", 2, ReportFormat::Text),
            dir.join("base_2.txt")
        );
    }

    #[test]
    fn sections_follow_the_results_panel() {
        let report = report(300.0);
        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Loan Details", "Monthly Payment Breakdown", "With Extra Payments"]
        );

        let text = report.to_text();
        assert!(text.starts_with("Mortgage Calculator Results\nGenerated on: 2024-03-07 09:15:00\n"));
        assert!(text.contains("  Loan Amount: kr255,000\n"));
        assert!(text.contains("  Interest Rate: 4.5%\n"));
        assert!(text.contains("  Total Principal: kr800\n"));
        assert!(text.contains("  Interest Payment: kr956\n"));
        assert!(text.contains("  Total Monthly Payment: kr1,956\n"));
        assert!(text.contains("  Time Saved: 16 years, 0 months\n"));
        assert!(text.contains("  Loan Payoff Time: 26 years, 6 months\n"));
    }

    #[test]
    fn text_lists_the_schedule() {
        let report = report(300.0);
        assert_eq!(report.schedule.len(), 318);

        let text = report.to_text();
        assert!(text.contains("\nAmortization Schedule\n"));
        let first = text
            .lines()
            .find(|line| line.trim_start().starts_with("1 "))
            .unwrap();
        let cells: Vec<&str> = first.split_whitespace().collect();
        assert_eq!(cells, ["1", "kr1,756", "kr500", "kr300", "kr956", "kr254,200"]);
        assert!(!text.contains("months shown"));
    }

    #[test]
    fn text_notes_a_truncated_schedule() {
        let input = LoanInput {
            monthly_principal_payment: 100.0,
            monthly_extra_payment: 0.0,
            ..report(0.0).input
        };
        let result = compute(&input).unwrap();
        let text = Report::new(&input, &result, report(0.0).generated_at).to_text();
        assert!(text.contains("  First 1,200 of 2,550 months shown\n"));
    }

    #[test]
    fn json_carries_raw_figures() {
        let bytes = report(0.0).render(ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["input"]["currency"], "kr");
        assert_eq!(value["result"]["base_months_to_payoff"], 510);
        assert_eq!(value["sections"][2]["entries"][0]["value"], "0 years, 0 months");
        assert_eq!(value["schedule"].as_array().unwrap().len(), 510);
        assert_eq!(value["schedule"][0]["month"], 1);
        assert_eq!(value["schedule"][0]["remaining_balance"], 254_500.0);
    }

    #[test]
    fn pdf_paginates_long_reports() {
        let mut report = report(0.0);
        assert!(report.to_pdf().windows(8).any(|w| w == b"/Count 1"));

        report.sections.push(Section {
            title: "Notes".to_string(),
            entries: (0..40)
                .map(|i| Entry::new("Line", i.to_string()))
                .collect(),
        });
        assert!(report.to_pdf().windows(8).any(|w| w == b"/Count 2"));
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("PDF".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("docx".parse::<ReportFormat>().is_err());
    }
}
