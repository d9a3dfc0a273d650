//! Разбор дат MT940.

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Парсит дату в формате `yyMMdd` или `yyyyMMdd`.
///
/// Двузначный год 00-49 относится к 2000-м, 50-99 к 1900-м.
pub fn decode_date(text: &str) -> Result<NaiveDate> {
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(text));
    }

    let (year, rest) = match text.len() {
        6 => {
            let yy: i32 = text[0..2].parse().map_err(|_| invalid(text))?;
            let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
            (year, &text[2..])
        }
        8 => (text[0..4].parse().map_err(|_| invalid(text))?, &text[4..]),
        _ => return Err(invalid(text)),
    };

    let month: u32 = rest[0..2].parse().map_err(|_| invalid(text))?;
    let day: u32 = rest[2..4].parse().map_err(|_| invalid(text))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid(text))
}

fn invalid(text: &str) -> Error {
    Error::format(format!(
        "дата должна быть в формате yyMMdd или yyyyMMdd, получено: '{}'",
        text
    ))
}
