use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    currency::Currency,
    error::{Error, Result, ValidationError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    LoanSeekingAmount,
    DownPayment,
    InterestRate,
    PrincipalPayment,
    ExtraPayment,
    MonthlyFee,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::LoanSeekingAmount => "Loan seeking amount",
            Field::DownPayment => "Down payment",
            Field::InterestRate => "Interest rate",
            Field::PrincipalPayment => "Principal payment",
            Field::ExtraPayment => "Extra payment",
            Field::MonthlyFee => "Monthly house fee",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a plain decimal number, ignoring whitespace and `,` separators.
/// An empty field reads as `0.0`.
pub fn parse_amount(field: Field, text: &str) -> Result<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }

    let parse_error = || Error::Parse {
        field,
        value: text.to_string(),
    };

    let unsigned = cleaned
        .strip_prefix('-')
        .or_else(|| cleaned.strip_prefix('+'))
        .unwrap_or(&cleaned);
    let mut digits = 0;
    let mut points = 0;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return Err(parse_error()),
        }
    }
    if digits == 0 || points > 1 {
        return Err(parse_error());
    }

    cleaned.parse::<f64>().map_err(|_| parse_error())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub loan_seeking_amount: f64,
    pub down_payment: f64,
    pub annual_interest_rate_percent: f64,
    pub monthly_principal_payment: f64,
    pub monthly_extra_payment: f64,
    pub monthly_fee: f64,
    pub currency: Currency,
}

impl LoanInput {
    pub fn loan_amount(&self) -> f64 {
        self.loan_seeking_amount - self.down_payment
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_interest_rate_percent / 100.0 / 12.0
    }

    fn values(&self) -> [(Field, f64); 6] {
        [
            (Field::LoanSeekingAmount, self.loan_seeking_amount),
            (Field::DownPayment, self.down_payment),
            (Field::InterestRate, self.annual_interest_rate_percent),
            (Field::PrincipalPayment, self.monthly_principal_payment),
            (Field::ExtraPayment, self.monthly_extra_payment),
            (Field::MonthlyFee, self.monthly_fee),
        ]
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        for (field, value) in self.values() {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite(field));
            }
        }

        if self.loan_seeking_amount <= 0.0 {
            return Err(ValidationError::LoanSeekingNotPositive);
        }
        if self.down_payment < 0.0 {
            return Err(ValidationError::Negative(Field::DownPayment));
        }
        if self.down_payment >= self.loan_seeking_amount {
            return Err(ValidationError::DownPaymentTooLarge);
        }
        let rate = self.annual_interest_rate_percent;
        if rate <= 0.0 || rate >= 100.0 {
            return Err(ValidationError::InterestRateOutOfRange);
        }
        for (field, value) in [
            (Field::PrincipalPayment, self.monthly_principal_payment),
            (Field::ExtraPayment, self.monthly_extra_payment),
            (Field::MonthlyFee, self.monthly_fee),
        ] {
            if value < 0.0 {
                return Err(ValidationError::Negative(field));
            }
        }
        Ok(())
    }
}
