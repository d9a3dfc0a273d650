//! Разбор балансов (:60a:, :62a:, :64:, :65:).

use rust_decimal::Decimal;
use std::str::FromStr;

use super::date::decode_date;
use crate::error::{Error, Result};
use crate::reader::TextReader;
use crate::types::{Balance, BalanceKind, DebitCreditMark};

/// Парсит баланс вида `C200101EUR444,29`.
pub fn decode_balance(chunk: &str, kind: BalanceKind) -> Result<Balance> {
    let mut reader = TextReader::new(chunk.trim());

    let mark = match reader.read(1) {
        "" => return Err(Error::structural("баланс пуст, ожидается индикатор дебета/кредита")),
        code @ ("C" | "D") => DebitCreditMark::from_str(code)?,
        other => {
            return Err(Error::format(format!(
                "индикатор баланса должен быть 'C' или 'D', получено: '{}'",
                other
            )))
        }
    };

    let date = reader.read(6);
    if date.chars().count() < 6 {
        return Err(Error::structural(format!(
            "дата баланса обрезана, ожидается шесть символов: '{}'",
            date
        )));
    }
    let date = decode_date(date)?;

    let currency = reader.read(3);
    if currency.chars().count() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::format(format!(
            "код валюты должен состоять из трех букв, получено: '{}'",
            currency
        )));
    }

    let amount = parse_amount(reader.read_to_end())?;

    Ok(Balance {
        kind,
        mark,
        date,
        currency: currency.to_string(),
        amount,
    })
}

/// Парсит неотрицательную сумму с запятой или точкой в качестве разделителя.
///
/// Банки пишут `65,` без дробной части, поэтому висящий разделитель
/// допускается. Сумма без единой цифры считается ошибкой.
pub(crate) fn parse_amount(text: &str) -> Result<Decimal> {
    let invalid = || Error::format(format!("некорректная сумма: '{}'", text));
    if !text.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut value = text.trim().replace(',', ".");
    if value.starts_with('.') {
        value.insert(0, '0');
    }
    if value.ends_with('.') {
        value.push('0');
    }

    if !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }

    Decimal::from_str(&value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_decode_balance() {
        let balance = decode_balance("C200101EUR444,29", BalanceKind::Opening).unwrap();
        assert_eq!(balance.kind, BalanceKind::Opening);
        assert_eq!(balance.mark, DebitCreditMark::Credit);
        assert_eq!(balance.date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(balance.currency, "EUR");
        assert_eq!(balance.amount, Decimal::new(44429, 2));
    }

    #[test]
    fn test_decode_balance_without_fraction() {
        let balance = decode_balance("D240315PLN1500,", BalanceKind::Available).unwrap();
        assert_eq!(balance.mark, DebitCreditMark::Debit);
        assert_eq!(balance.amount, Decimal::new(1500, 0));
    }

    #[test]
    fn test_decode_balance_rejects_bad_mark() {
        let err = decode_balance("X200101EUR1,00", BalanceKind::Closing).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_decode_balance_truncated_date() {
        let err = decode_balance("C2001", BalanceKind::Closing).unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_decode_balance_rejects_bad_currency_and_amount() {
        assert!(matches!(
            decode_balance("C200101E1R1,00", BalanceKind::Closing),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            decode_balance("C200101EUR", BalanceKind::Closing),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            decode_balance("C200101EUR1,0,0", BalanceKind::Closing),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("65,00").unwrap(), Decimal::new(6500, 2));
        assert_eq!(parse_amount(",5").unwrap(), Decimal::new(5, 1));
        assert!(parse_amount("").is_err());
        assert!(parse_amount("-5").is_err());
    }

    #[test]
    fn test_separator_alone_is_not_an_amount() {
        assert!(matches!(parse_amount("."), Err(Error::Format(_))));
        assert!(matches!(parse_amount(","), Err(Error::Format(_))));
        assert!(matches!(
            decode_balance("C240101EUR,", BalanceKind::Closing),
            Err(Error::Format(_))
        ));
    }
}
