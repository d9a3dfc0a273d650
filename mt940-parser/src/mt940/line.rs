//! Разбор строки выписки (поле :61:).
//!
//! Поле позиционное: подполя читаются строго слева направо.
//!
//! ```text
//! 6!n[4!n]2a[1!a]15d1!a3!c16x[//16x]
//! [34x]
//! ```

use chrono::{Months, NaiveDate};

use super::balance::parse_amount;
use super::date::decode_date;
use crate::error::{Error, Result};
use crate::reader::TextReader;
use crate::types::{DebitCreditMark, StatementLine};

const BANK_REFERENCE_MARKER: &str = "//";
const LINE_BREAKS: [&str; 2] = ["\r\n", "\n"];

const REFERENCE_LEN: usize = 16;
const SUPPLEMENTARY_LEN: usize = 34;

/// Парсит содержимое поля :61: в строку выписки.
pub fn decode_statement_line(chunk: &str) -> Result<StatementLine> {
    let mut reader = TextReader::new(chunk);

    let value_date = read_value_date(&mut reader)?;
    let entry_date = read_entry_date(&mut reader, value_date)?;
    let mark = read_mark(&mut reader)?;
    let funds_code = reader.read_while(|c| c.is_alphabetic(), 1).chars().next();
    let amount = read_amount(&mut reader)?;

    let mut line = StatementLine {
        value_date,
        entry_date,
        mark,
        funds_code,
        amount,
        transaction_type_id_code: None,
        customer_reference: String::new(),
        bank_reference: None,
        supplementary_details: None,
        information: None,
    };

    if read_transaction_type(&mut reader, &mut line) {
        read_references(&mut reader, &mut line)?;
    }

    let leftover = reader.read_to_end();
    if !leftover.is_empty() && line.supplementary_details.is_none() {
        let details = take_chars(strip_line_break(leftover), SUPPLEMENTARY_LEN);
        if !details.is_empty() {
            tracing::warn!("Остаток строки :61: сохранен как доп. сведения: {}", details);
            line.supplementary_details = Some(details);
        }
    }

    Ok(line)
}

fn read_value_date(reader: &mut TextReader<'_>) -> Result<NaiveDate> {
    let value = reader.read(6);
    if value.chars().count() < 6 {
        return Err(Error::structural(
            "строка выписки оборвалась: ожидается дата валютирования из шести символов",
        ));
    }
    decode_date(value)
}

/// Дата проводки задается как `MMdd`, год берется из даты валютирования.
fn read_entry_date(reader: &mut TextReader<'_>, value_date: NaiveDate) -> Result<Option<NaiveDate>> {
    let digits = reader.read_while(|c| c.is_ascii_digit(), 4);
    if digits.is_empty() {
        return Ok(None);
    }
    if digits.len() < 4 {
        return Err(Error::structural(format!(
            "дата проводки должна состоять из четырех цифр, получено: '{}'",
            digits
        )));
    }

    let candidate = decode_date(&format!("{}{}", value_date.format("%y"), digits))?;
    // Между проводкой и валютированием мог смениться год.
    let entry_date = if candidate > value_date {
        candidate
            .checked_sub_months(Months::new(12))
            .ok_or_else(|| Error::format(format!("некорректная дата проводки: '{}'", digits)))?
    } else {
        candidate
    };

    Ok(Some(entry_date))
}

fn read_mark(reader: &mut TextReader<'_>) -> Result<DebitCreditMark> {
    let first = reader.read(1);
    if first.is_empty() {
        return Err(Error::structural(
            "строка выписки оборвалась: ожидается индикатор дебета/кредита",
        ));
    }

    if first == "R" {
        let second = reader.read(1);
        if second.is_empty() {
            return Err(Error::structural(
                "строка выписки оборвалась: ожидается двухсимвольный индикатор сторно",
            ));
        }
        return format!("{}{}", first, second).parse();
    }

    first.parse()
}

fn read_amount(reader: &mut TextReader<'_>) -> Result<rust_decimal::Decimal> {
    let value = reader.read_while(|c| c.is_ascii_digit() || c == '.' || c == ',', 15);
    if value.is_empty() {
        return Err(Error::structural(
            "строка выписки оборвалась: ожидается сумма",
        ));
    }
    parse_amount(value)
}

/// Читает код типа транзакции. Возвращает false, если банк обрезал
/// строку и дальше читать нечего.
fn read_transaction_type(reader: &mut TextReader<'_>, line: &mut StatementLine) -> bool {
    let constant = reader.read(1);
    if constant.is_empty() {
        return false;
    }
    if constant != "N" {
        // Встречается "F" и другие буквы, на разбор это не влияет.
        tracing::warn!("Нестандартный префикс типа транзакции: {}", constant);
    }

    let code = reader.read(3);
    if code.chars().count() < 3 {
        tracing::warn!("Код типа транзакции обрезан: {}{}", constant, code);
        return false;
    }

    line.transaction_type_id_code = Some(code.to_string());
    true
}

/// Референс клиента, затем опционально `//` с референсом банка и перевод
/// строки с дополнительными сведениями.
fn read_references(reader: &mut TextReader<'_>, line: &mut StatementLine) -> Result<()> {
    let window = reader.peek(REFERENCE_LEN + 2);
    let mut window_reader = TextReader::new(window);
    let (customer, terminator) =
        window_reader.read_to(&[BANK_REFERENCE_MARKER, LINE_BREAKS[0], LINE_BREAKS[1]]);

    let customer = match terminator {
        Some(_) => {
            reader.skip(customer.chars().count());
            customer
        }
        None => reader.read(REFERENCE_LEN),
    };

    if customer.is_empty() {
        return Err(Error::structural(
            "строка выписки оборвалась: ожидается референс клиента",
        ));
    }
    line.customer_reference = take_chars(customer, REFERENCE_LEN);

    match terminator {
        Some(0) => read_bank_reference(reader, line),
        Some(_) => {
            read_line_break(reader);
            read_supplementary_details(reader, line);
        }
        None => {}
    }

    Ok(())
}

fn read_bank_reference(reader: &mut TextReader<'_>, line: &mut StatementLine) {
    reader.skip(BANK_REFERENCE_MARKER.len());

    let window = reader.peek(REFERENCE_LEN + 2);
    let mut window_reader = TextReader::new(window);
    let (value, terminator) = window_reader.read_to(&LINE_BREAKS);

    let value = match terminator {
        Some(_) => {
            reader.skip(value.chars().count());
            value
        }
        None => reader.read(REFERENCE_LEN),
    };

    if !value.is_empty() {
        line.bank_reference = Some(take_chars(value, REFERENCE_LEN));
    }

    if terminator.is_some() {
        read_line_break(reader);
        read_supplementary_details(reader, line);
    }
}

fn read_supplementary_details(reader: &mut TextReader<'_>, line: &mut StatementLine) {
    let value = reader.read(SUPPLEMENTARY_LEN);
    if !value.is_empty() {
        line.supplementary_details = Some(value.to_string());
    }
}

fn read_line_break(reader: &mut TextReader<'_>) {
    if reader.peek(2) == LINE_BREAKS[0] {
        reader.skip(2);
    } else if reader.peek(1) == LINE_BREAKS[1] {
        reader.skip(1);
    }
}

fn strip_line_break(text: &str) -> &str {
    text.strip_prefix(LINE_BREAKS[0])
        .or_else(|| text.strip_prefix(LINE_BREAKS[1]))
        .unwrap_or(text)
}

fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_line() {
        let line =
            decode_statement_line("2403150314DR1234,56NTRFCUSTREF123//BANKREF456\r\nDETAILS").unwrap();
        assert_eq!(line.value_date, date(2024, 3, 15));
        assert_eq!(line.entry_date, Some(date(2024, 3, 14)));
        assert_eq!(line.mark, DebitCreditMark::Debit);
        assert_eq!(line.funds_code, Some('R'));
        assert_eq!(line.amount, Decimal::new(123456, 2));
        assert_eq!(line.transaction_type_id_code.as_deref(), Some("TRF"));
        assert_eq!(line.customer_reference, "CUSTREF123");
        assert_eq!(line.bank_reference.as_deref(), Some("BANKREF456"));
        assert_eq!(line.supplementary_details.as_deref(), Some("DETAILS"));
        assert!(line.information.is_none());
    }

    #[test]
    fn test_entry_date_year_rollover() {
        let line = decode_statement_line("2401011231C10,00NTRFNONREF").unwrap();
        assert_eq!(line.value_date, date(2024, 1, 1));
        assert_eq!(line.entry_date, Some(date(2023, 12, 31)));
    }

    #[test]
    fn test_entry_date_before_value_date_is_kept() {
        let line = decode_statement_line("2412310102C10,00NTRFNONREF").unwrap();
        assert_eq!(line.entry_date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_partial_entry_date_is_structural_error() {
        let err = decode_statement_line("24010112C10,00").unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_reversal_marks() {
        let line = decode_statement_line("240101RC5,NMSCREF").unwrap();
        assert_eq!(line.mark, DebitCreditMark::ReverseCredit);
        assert_eq!(line.funds_code, None);
        assert_eq!(line.amount, Decimal::new(5, 0));

        let line = decode_statement_line("240101RD5,NMSCREF").unwrap();
        assert_eq!(line.mark, DebitCreditMark::ReverseDebit);
    }

    #[test]
    fn test_malformed_mark_is_format_error() {
        let err = decode_statement_line("240101X10,00NTRFREF").unwrap_err();
        assert!(matches!(err, Error::Format(_)));

        let err = decode_statement_line("240101RX10,00NTRFREF").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_short_value_date() {
        let err = decode_statement_line("2401").unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_missing_amount() {
        let err = decode_statement_line("240101CNTRFREF").unwrap_err();
        assert!(matches!(err, Error::Structural(_)));
    }

    #[test]
    fn test_amount_without_digits_is_format_error() {
        let err = decode_statement_line("240101C.NTRFREF").unwrap_err();
        assert!(matches!(err, Error::Format(_)));

        let err = decode_statement_line("240101C,NTRFREF").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_line_ending_after_amount() {
        let line = decode_statement_line("240101C100,").unwrap();
        assert_eq!(line.amount, Decimal::new(100, 0));
        assert_eq!(line.transaction_type_id_code, None);
        assert_eq!(line.customer_reference, "");
    }

    #[test]
    fn test_truncated_transaction_type() {
        let line = decode_statement_line("240101C100,FTR").unwrap();
        assert_eq!(line.transaction_type_id_code, None);
        assert_eq!(line.supplementary_details, None);
    }

    #[test]
    fn test_customer_reference_with_supplementary_details() {
        let line = decode_statement_line("240101C1,00NTRFREF1\r\nDETAILS ABOUT PAYMENT").unwrap();
        assert_eq!(line.customer_reference, "REF1");
        assert_eq!(line.bank_reference, None);
        assert_eq!(line.supplementary_details.as_deref(), Some("DETAILS ABOUT PAYMENT"));
    }

    #[test]
    fn test_full_length_customer_reference() {
        let line = decode_statement_line("240101C1,00NTRF1234567890ABCDEF//BANK").unwrap();
        assert_eq!(line.customer_reference, "1234567890ABCDEF");
        assert_eq!(line.bank_reference.as_deref(), Some("BANK"));
    }

    #[test]
    fn test_leftover_becomes_supplementary_details() {
        let line = decode_statement_line("2001010101D65,00NOVBNL47INGB9999999999\nhr gjlm paulissen").unwrap();
        assert_eq!(line.customer_reference, "NL47INGB99999999");
        assert_eq!(line.supplementary_details.as_deref(), Some("99\nhr gjlm paulissen"));
    }

    #[test]
    fn test_supplementary_details_are_limited() {
        let details = "X".repeat(40);
        let line = decode_statement_line(&format!("240101C1,00NTRFREF\r\n{}", details)).unwrap();
        assert_eq!(line.supplementary_details.map(|d| d.len()), Some(34));
    }
}
