use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    currency::Currency,
    error::{Error, Result},
    input::{parse_amount, Field},
    report::ReportFormat,
};

pub const DEFAULT_INTEREST_RATE: &str = "4.5";
pub const DEFAULT_AUTO_DOWN_PAYMENT_PERCENT: f64 = 15.0;
pub const DEFAULT_OUTPUT_DIR: &str = "exports";
pub const DEFAULT_LOG_FILE: &str = "mortgage-calculator.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub currency: Currency,
    pub interest_rate: String,
    pub auto_down_payment_percent: f64,
    pub output_dir: PathBuf,
    pub report_format: ReportFormat,
    // defaults to DEFAULT_LOG_FILE inside output_dir
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            interest_rate: DEFAULT_INTEREST_RATE.to_string(),
            auto_down_payment_percent: DEFAULT_AUTO_DOWN_PAYMENT_PERCENT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_format: ReportFormat::default(),
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..100.0).contains(&self.auto_down_payment_percent) {
            return Err(Error::Config(format!(
                "auto_down_payment_percent must be in [0, 100), got {}",
                self.auto_down_payment_percent
            )));
        }
        let rate = parse_amount(Field::InterestRate, &self.interest_rate)
            .map_err(|e| Error::Config(e.to_string()))?;
        if rate < 0.0 || rate >= 100.0 {
            return Err(Error::Config(format!(
                "interest_rate must be below 100, got {}",
                self.interest_rate
            )));
        }
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join(DEFAULT_LOG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let settings = Settings::from_json(r#"{ "currency": "€" }"#).unwrap();
        assert_eq!(settings.currency, Currency::Eur);
        assert_eq!(settings.interest_rate, "4.5");
        assert_eq!(settings.auto_down_payment_percent, 15.0);
        assert_eq!(settings.report_format, ReportFormat::Pdf);
        assert_eq!(settings.log_path(), PathBuf::from("exports/mortgage-calculator.log"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Settings::from_json(r#"{ "loan_term": 15 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_bad_values() {
        let settings = Settings {
            auto_down_payment_percent: 120.0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            interest_rate: "four".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "report_format": "json", "output_dir": "out", "log_file": "calc.log" }"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.report_format, ReportFormat::Json);
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.log_path(), PathBuf::from("calc.log"));

        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}
