use crate::{
    config::Settings,
    currency::Currency,
    engine::{compute, MortgageResult},
    error::Result,
    format::format_grouped,
    input::{parse_amount, Field, LoanInput},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownPaymentMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub input: LoanInput,
    pub result: MortgageResult,
}

#[derive(Debug, Clone)]
pub struct LoanForm {
    loan_seeking: String,
    down_payment: String,
    interest_rate: String,
    principal_payment: String,
    extra_payment: String,
    monthly_fee: String,
    currency: Currency,
    down_payment_mode: DownPaymentMode,
    calculation: Option<Calculation>,
    defaults: Settings,
}

impl Default for LoanForm {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl LoanForm {
    pub fn new(settings: &Settings) -> Self {
        Self {
            loan_seeking: String::new(),
            down_payment: String::new(),
            interest_rate: settings.interest_rate.clone(),
            principal_payment: String::new(),
            extra_payment: String::new(),
            monthly_fee: String::new(),
            currency: settings.currency,
            down_payment_mode: DownPaymentMode::default(),
            calculation: None,
            defaults: settings.clone(),
        }
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::LoanSeekingAmount => &self.loan_seeking,
            Field::DownPayment => &self.down_payment,
            Field::InterestRate => &self.interest_rate,
            Field::PrincipalPayment => &self.principal_payment,
            Field::ExtraPayment => &self.extra_payment,
            Field::MonthlyFee => &self.monthly_fee,
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::LoanSeekingAmount => &mut self.loan_seeking,
            Field::DownPayment => &mut self.down_payment,
            Field::InterestRate => &mut self.interest_rate,
            Field::PrincipalPayment => &mut self.principal_payment,
            Field::ExtraPayment => &mut self.extra_payment,
            Field::MonthlyFee => &mut self.monthly_fee,
        }
    }

    pub fn is_editable(&self, field: Field) -> bool {
        field != Field::DownPayment || self.down_payment_mode == DownPaymentMode::Manual
    }

    pub fn set_text(&mut self, field: Field, text: &str) {
        if !self.is_editable(field) {
            return;
        }
        *self.text_mut(field) = text.to_string();
        self.field_changed(field);
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        if !self.is_editable(field) {
            return;
        }
        self.text_mut(field).push(c);
        self.field_changed(field);
    }

    pub fn pop_char(&mut self, field: Field) {
        if !self.is_editable(field) {
            return;
        }
        self.text_mut(field).pop();
        self.field_changed(field);
    }

    fn field_changed(&mut self, field: Field) {
        if field == Field::LoanSeekingAmount {
            self.sync_down_payment();
            if self.calculation.is_some() {
                if let Err(err) = self.calculate() {
                    tracing::debug!(error = %err, "dropped stale calculation");
                }
            }
        }
    }

    // auto mode derives the down payment from the loan seeking amount
    fn sync_down_payment(&mut self) {
        match parse_amount(Field::LoanSeekingAmount, &self.loan_seeking) {
            Ok(seeking) if seeking > 0.0 => match self.down_payment_mode {
                DownPaymentMode::Auto => {
                    let percent = self.defaults.auto_down_payment_percent;
                    self.down_payment = format_grouped(seeking * percent / 100.0);
                }
                DownPaymentMode::Manual => {
                    if self.down_payment.is_empty() {
                        self.down_payment = "0".to_string();
                    }
                }
            },
            _ => self.down_payment.clear(),
        }
    }

    pub fn down_payment_mode(&self) -> DownPaymentMode {
        self.down_payment_mode
    }

    pub fn set_down_payment_mode(&mut self, mode: DownPaymentMode) {
        self.down_payment_mode = mode;
        self.sync_down_payment();
    }

    pub fn toggle_down_payment_mode(&mut self) {
        let mode = match self.down_payment_mode {
            DownPaymentMode::Auto => DownPaymentMode::Manual,
            DownPaymentMode::Manual => DownPaymentMode::Auto,
        };
        self.set_down_payment_mode(mode);
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
        if let Some(calculation) = &mut self.calculation {
            calculation.input.currency = currency;
        }
    }

    pub fn loan_amount_preview(&self) -> Option<f64> {
        let seeking = parse_amount(Field::LoanSeekingAmount, &self.loan_seeking).ok()?;
        if seeking <= 0.0 {
            return None;
        }
        let down = parse_amount(Field::DownPayment, &self.down_payment).ok()?;
        Some(if down <= seeking { seeking - down } else { 0.0 })
    }

    pub fn to_input(&self) -> Result<LoanInput> {
        let input = LoanInput {
            loan_seeking_amount: parse_amount(Field::LoanSeekingAmount, &self.loan_seeking)?,
            down_payment: parse_amount(Field::DownPayment, &self.down_payment)?,
            annual_interest_rate_percent: parse_amount(Field::InterestRate, &self.interest_rate)?,
            monthly_principal_payment: parse_amount(
                Field::PrincipalPayment,
                &self.principal_payment,
            )?,
            monthly_extra_payment: parse_amount(Field::ExtraPayment, &self.extra_payment)?,
            monthly_fee: parse_amount(Field::MonthlyFee, &self.monthly_fee)?,
            currency: self.currency,
        };
        input.validate()?;
        Ok(input)
    }

    // a failed calculation drops the previous result
    pub fn calculate(&mut self) -> Result<&Calculation> {
        let outcome = self
            .to_input()
            .and_then(|input| compute(&input).map(|result| Calculation { input, result }));
        match outcome {
            Ok(calculation) => Ok(self.calculation.insert(calculation)),
            Err(err) => {
                self.calculation = None;
                Err(err)
            }
        }
    }

    pub fn calculation(&self) -> Option<&Calculation> {
        self.calculation.as_ref()
    }

    pub fn clear(&mut self) {
        *self = Self::new(&self.defaults);
    }
}
