use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses an RFC3339 timestamp stored as TEXT, falling back to now.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parses a decimal stored as TEXT, falling back to zero.
pub(crate) fn parse_decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_reads_back_display_format() {
        assert_eq!(parse_decimal(&dec!(100.25).to_string()), dec!(100.25));
        assert_eq!(parse_decimal("garbage"), Decimal::ZERO);
    }

    #[test]
    fn parse_datetime_roundtrips_rfc3339() {
        let now = Utc::now();
        assert_eq!(parse_datetime(&now.to_rfc3339()), now);
    }
}
