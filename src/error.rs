use thiserror::Error;

use crate::input::Field;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{field}: invalid number format '{value}'")]
    Parse { field: Field, value: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0} must be greater than 0 to compute the payoff time")]
    DivisionByZero(Field),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn field(&self) -> Option<Field> {
        match self {
            Error::Parse { field, .. } => Some(*field),
            Error::Validation(err) => Some(err.field()),
            Error::DivisionByZero(field) => Some(*field),
            Error::Io(_) | Error::Config(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    #[error("Loan seeking amount must be greater than 0")]
    LoanSeekingNotPositive,

    #[error("Down payment must be less than loan seeking amount")]
    DownPaymentTooLarge,

    #[error("Interest rate must be between 0 and 100")]
    InterestRateOutOfRange,

    #[error("{0} cannot be negative")]
    Negative(Field),

    #[error("{0} must be a finite number")]
    NotFinite(Field),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::LoanSeekingNotPositive => Field::LoanSeekingAmount,
            ValidationError::DownPaymentTooLarge => Field::DownPayment,
            ValidationError::InterestRateOutOfRange => Field::InterestRate,
            ValidationError::Negative(field) | ValidationError::NotFinite(field) => *field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = Error::from(ValidationError::Negative(Field::MonthlyFee));
        assert_eq!(err.to_string(), "Monthly house fee cannot be negative");
        assert_eq!(err.field(), Some(Field::MonthlyFee));

        let err = Error::DivisionByZero(Field::PrincipalPayment);
        assert_eq!(
            err.to_string(),
            "Principal payment must be greater than 0 to compute the payoff time"
        );
    }

    #[test]
    fn io_errors_have_no_field() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(err.field(), None);
        assert!(err.to_string().starts_with("Failed to write report"));
    }
}
