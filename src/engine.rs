use std::fmt;

use serde::Serialize;

use crate::{
    error::{Error, Result},
    input::{Field, LoanInput},
};

pub const LOAN_TERM_MONTHS: u32 = 360;

// Longer schedules are cut off at 100 years.
pub const MAX_SCHEDULE_MONTHS: u64 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PayoffSpan {
    pub years: u64,
    pub months: u64,
}

impl PayoffSpan {
    pub fn from_months(total: u64) -> Self {
        Self {
            years: total / 12,
            months: total % 12,
        }
    }
}

impl fmt::Display for PayoffSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years, {} months", self.years, self.months)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MortgageResult {
    pub loan_amount: f64,
    pub monthly_rate: f64,
    pub standard_payment: f64,
    pub monthly_interest: f64,
    pub total_principal_payment: f64,
    pub total_monthly_payment: f64,
    pub base_total_interest_over_term: f64,
    pub base_months_to_payoff: u64,
    pub months_to_payoff_with_extra: u64,
    pub years_to_payoff: u64,
    pub months_to_payoff_remainder: u64,
    pub months_saved: u64,
    pub years_saved: u64,
    pub months_saved_remainder: u64,
    pub total_interest_with_extra: f64,
    pub interest_saved: f64,
}

impl MortgageResult {
    pub fn payoff_span(&self) -> PayoffSpan {
        PayoffSpan {
            years: self.years_to_payoff,
            months: self.months_to_payoff_remainder,
        }
    }

    pub fn time_saved_span(&self) -> PayoffSpan {
        PayoffSpan {
            years: self.years_saved,
            months: self.months_saved_remainder,
        }
    }
}

/// Standard fixed monthly payment for `loan_amount` over `months` periods.
pub fn standard_payment(loan_amount: f64, monthly_rate: f64, months: u32) -> f64 {
    let periods = f64::from(months);
    // 1 - (1 + r)^-n, without the cancellation powi suffers for tiny r
    let denominator = -(-periods * monthly_rate.ln_1p()).exp_m1();
    if denominator > 0.0 && denominator.is_finite() {
        (loan_amount * monthly_rate) / denominator
    } else {
        loan_amount / periods
    }
}

// Interest accrued over `months` periods when `payment` is subtracted from
// the balance each month. The balance is not clamped at zero. Horizons past
// the loan term use the closed form of the same arithmetic series.
fn simulate_interest(loan_amount: f64, monthly_rate: f64, payment: f64, months: u64) -> f64 {
    if months > u64::from(LOAN_TERM_MONTHS) {
        let n = months as f64;
        return monthly_rate * (n * loan_amount - payment * n * (n - 1.0) / 2.0);
    }
    let mut remaining_balance = loan_amount;
    let mut total_interest = 0.0;
    for _ in 0..months {
        total_interest += remaining_balance * monthly_rate;
        remaining_balance -= payment;
    }
    total_interest
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow {
    pub month: u64,
    pub payment: f64,
    pub principal: f64,
    pub extra: f64,
    pub interest: f64,
    pub remaining_balance: f64,
}

/// Month-by-month rows of the simulation that pays `total_principal_payment`
/// each month until `months_to_payoff_with_extra`, capped at
/// [`MAX_SCHEDULE_MONTHS`] rows. With an extra payment the interest column
/// sums to `total_interest_with_extra`.
pub fn schedule(input: &LoanInput, result: &MortgageResult) -> Vec<ScheduleRow> {
    let months = result.months_to_payoff_with_extra.min(MAX_SCHEDULE_MONTHS);
    let mut remaining_balance = result.loan_amount;
    let mut rows = Vec::with_capacity(months as usize);
    for month in 1..=months {
        let interest = remaining_balance * result.monthly_rate;
        remaining_balance -= result.total_principal_payment;
        rows.push(ScheduleRow {
            month,
            payment: result.total_principal_payment + interest,
            principal: input.monthly_principal_payment,
            extra: input.monthly_extra_payment,
            interest,
            remaining_balance,
        });
    }
    rows
}

pub fn compute(input: &LoanInput) -> Result<MortgageResult> {
    input.validate()?;
    if input.monthly_principal_payment == 0.0 {
        return Err(Error::DivisionByZero(Field::PrincipalPayment));
    }

    let loan_amount = input.loan_amount();
    let monthly_rate = input.monthly_rate();

    let standard_payment = standard_payment(loan_amount, monthly_rate, LOAN_TERM_MONTHS);
    let base_total_interest_over_term =
        standard_payment * f64::from(LOAN_TERM_MONTHS) - loan_amount;

    let monthly_interest = loan_amount * monthly_rate;
    let total_monthly_payment = input.monthly_principal_payment
        + input.monthly_extra_payment
        + monthly_interest
        + input.monthly_fee;

    let base_months_to_payoff = (loan_amount / input.monthly_principal_payment).floor() as u64;

    let total_principal_payment = input.monthly_principal_payment + input.monthly_extra_payment;
    // interest_saved compares the standard-payment baseline with the
    // simulated principal+extra schedule
    let (months_with_extra, total_interest_with_extra, interest_saved) =
        if input.monthly_extra_payment > 0.0 {
            let months = (loan_amount / total_principal_payment).floor() as u64;
            let interest =
                simulate_interest(loan_amount, monthly_rate, total_principal_payment, months);
            (months, interest, base_total_interest_over_term - interest)
        } else {
            (base_months_to_payoff, 0.0, 0.0)
        };

    let months_saved = base_months_to_payoff.saturating_sub(months_with_extra);
    let payoff = PayoffSpan::from_months(months_with_extra);
    let saved = PayoffSpan::from_months(months_saved);

    tracing::debug!(
        loan_amount,
        monthly_rate,
        base_months_to_payoff,
        months_with_extra,
        "computed mortgage figures"
    );

    Ok(MortgageResult {
        loan_amount,
        monthly_rate,
        standard_payment,
        monthly_interest,
        total_principal_payment,
        total_monthly_payment,
        base_total_interest_over_term,
        base_months_to_payoff,
        months_to_payoff_with_extra: months_with_extra,
        years_to_payoff: payoff.years,
        months_to_payoff_remainder: payoff.months,
        months_saved,
        years_saved: saved.years,
        months_saved_remainder: saved.months,
        total_interest_with_extra,
        interest_saved,
    })
}
