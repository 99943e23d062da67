use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A monetary amount with two decimal places, displayed in Brazilian
/// format: `R$ 1.234,56`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::from(100)).round().to_i64().unwrap_or(0)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Self::from_decimal)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Parses an amount written either Brazilian style (`1.234,56`) or plain
    /// (`1234.56`). A comma anywhere means comma-as-decimal and
    /// dot-as-thousands; otherwise the dot is already the decimal point.
    /// Currency markers and spaces are ignored.
    pub fn parse_br(s: &str) -> Option<Self> {
        let s = s.trim().replace("R$", "").replace("r$", "").replace(' ', "");
        if s.is_empty() {
            return None;
        }
        let s = if s.contains(',') {
            s.replace('.', "").replace(',', ".")
        } else {
            s
        };
        Decimal::from_str(&s).ok().map(Self::from_decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let raw = rounded.abs().to_string();
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, frac)) => (i.to_string(), format!("{frac:0<2}")),
            None => (raw, "00".to_string()),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        let digits = int_part.as_bytes();
        for (i, d) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*d as char);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "R$ {sign}{grouped},{frac_part}")
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_round_trip() {
        assert_eq!(Money::from_cents(12345).to_cents(), 12345);
        assert_eq!(Money::from_cents(-500).to_cents(), -500);
    }

    #[test]
    fn display_brazilian_format() {
        assert_eq!(Money::from_cents(190000).to_string(), "R$ 1.900,00");
        assert_eq!(Money::from_cents(123456789).to_string(), "R$ 1.234.567,89");
        assert_eq!(Money::from_cents(50).to_string(), "R$ 0,50");
        assert_eq!(Money::from_cents(-123456).to_string(), "R$ -1.234,56");
    }

    #[test]
    fn parse_br_comma_decimal() {
        assert_eq!(Money::parse_br("1.234,56").unwrap().to_cents(), 123456);
        assert_eq!(Money::parse_br("1900,5").unwrap().to_cents(), 190050);
    }

    #[test]
    fn parse_br_dot_decimal() {
        assert_eq!(Money::parse_br("1234.56").unwrap().to_cents(), 123456);
        assert_eq!(Money::parse_br("150").unwrap().to_cents(), 15000);
    }

    #[test]
    fn parse_br_currency_marker() {
        assert_eq!(Money::parse_br("R$ 1.900,00").unwrap().to_cents(), 190000);
        assert_eq!(Money::parse_br("r$ 42").unwrap().to_cents(), 4200);
    }

    #[test]
    fn parse_br_garbage() {
        assert!(Money::parse_br("").is_none());
        assert!(Money::parse_br("abc").is_none());
        assert!(Money::parse_br("R$ ").is_none());
    }

    #[test]
    fn format_then_parse_round_trip() {
        let original = Money::from_cents(987654321);
        let reparsed = Money::parse_br(&original.to_string()).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn positivity() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::from_cents(-1).is_positive());
    }
}
