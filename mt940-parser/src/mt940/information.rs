//! Разбор информации для владельца счета (поле :86:).
//!
//! Поле начинается с необязательного числового кода транзакции, за которым
//! идут подполя вида `<разделитель><код><значение>`. Разделитель банк
//! выбирает сам (`?`, `~`, `^` и т.д.), поэтому он определяется по первому
//! символу. Коды 61-63 содержат идентификаторы SEPA (`EREF+`, `SVWZ+`, ...).

use once_cell::sync::Lazy;
use regex::Regex;

use super::date::decode_date;
use crate::error::{Error, Result};
use crate::reader::TextReader;
use crate::types::Information;

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));

const REMITTANCE_IDENTIFIER_LEN: usize = 5;

/// Идентификатор подполя SEPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Remittance {
    EndToEndReference,
    CustomerReference,
    MandateReference,
    CreditorReference,
    OriginatorsIdentificationCode,
    CompensationAmount,
    OriginalAmount,
    SepaRemittanceInformation,
    PayersReferenceParty,
    CreditorsReferenceParty,
}

impl Remittance {
    fn from_identifier(identifier: &str) -> Option<Self> {
        let remittance = match identifier {
            "EREF+" => Remittance::EndToEndReference,
            "KREF+" => Remittance::CustomerReference,
            "MREF+" => Remittance::MandateReference,
            "CRED+" => Remittance::CreditorReference,
            "DEBT+" => Remittance::OriginatorsIdentificationCode,
            "COAM+" => Remittance::CompensationAmount,
            "OAMT+" => Remittance::OriginalAmount,
            "SVWZ+" => Remittance::SepaRemittanceInformation,
            "ABWA+" => Remittance::PayersReferenceParty,
            "ABWE+" => Remittance::CreditorsReferenceParty,
            _ => return None,
        };
        Some(remittance)
    }

    fn field(self, information: &mut Information) -> &mut String {
        match self {
            Remittance::EndToEndReference => &mut information.end_to_end_reference,
            Remittance::CustomerReference => &mut information.customer_reference,
            Remittance::MandateReference => &mut information.mandate_reference,
            Remittance::CreditorReference => &mut information.creditor_reference,
            Remittance::OriginatorsIdentificationCode => {
                &mut information.originators_identification_code
            }
            Remittance::CompensationAmount => &mut information.compensation_amount,
            Remittance::OriginalAmount => &mut information.original_amount,
            Remittance::SepaRemittanceInformation => &mut information.sepa_remittance_information,
            Remittance::PayersReferenceParty => &mut information.payers_reference_party,
            Remittance::CreditorsReferenceParty => &mut information.creditors_reference_party,
        }
    }
}

/// Парсит содержимое поля :86:.
pub fn decode_information(chunk: &str) -> Result<Information> {
    let mut information = Information::default();

    let mut reader = TextReader::new(chunk);
    let code = reader.read_while(|c| c.is_ascii_digit(), 4);
    if !code.is_empty() {
        information.transaction_code = Some(
            code.parse()
                .map_err(|_| Error::format(format!("некорректный код транзакции: '{}'", code)))?,
        );
    }

    // Поле может быть разбито на физические строки, склеиваем до разбора.
    let unwrapped: String = reader
        .read_to_end()
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect();

    SubfieldDecoder::new(&unwrapped).decode(&mut information)?;

    Ok(information)
}

/// Состояние разбора подполей одного поля :86:.
struct SubfieldDecoder<'a> {
    reader: TextReader<'a>,
    separator: Option<char>,
    last_remittance: Option<Remittance>,
}

impl<'a> SubfieldDecoder<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            reader: TextReader::new(text),
            separator: None,
            last_remittance: None,
        }
    }

    fn decode(mut self, information: &mut Information) -> Result<()> {
        let separator = self.reader.read_while(is_separator, 1).chars().next();
        let Some(separator) = separator else {
            // Неструктурированный текст.
            let value = self.read_value();
            information.operation_description.push_str(&value);
            return Ok(());
        };
        self.separator = Some(separator);

        loop {
            let code = self.read_field_code()?;
            let Some(code) = code else {
                break;
            };
            self.dispatch(&code, information)?;

            match self.reader.read(1).chars().next() {
                None => break,
                Some(c) if c == separator => continue,
                Some(c) => {
                    return Err(Error::structural(format!(
                        "неожиданный символ '{}', ожидается разделитель '{}'",
                        c, separator
                    )))
                }
            }
        }

        Ok(())
    }

    /// Двухсимвольный код, либо текстовый код до двоеточия, если код
    /// начинается не с цифры (`TYT.:`, `DLA:`, `REF. KLIENTA:`).
    fn read_field_code(&mut self) -> Result<Option<String>> {
        let head = self.reader.read(2);
        match head.chars().count() {
            0 => return Ok(None),
            1 => {
                return Err(Error::structural(format!(
                    "поле :86: оборвалось: ожидается код подполя, получено '{}'",
                    head
                )))
            }
            _ => {}
        }

        let starts_with_digit = head.chars().next().is_some_and(|c| c.is_ascii_digit());
        if starts_with_digit {
            return Ok(Some(head.to_string()));
        }

        let mut code = head.to_string();
        code.push_str(self.reader.read_while(|c| c != ':', usize::MAX).trim());
        code.push_str(self.reader.read(1));
        Ok(Some(code.trim().to_string()))
    }

    fn dispatch(&mut self, code: &str, information: &mut Information) -> Result<()> {
        match code {
            "00" => information.posting_text = self.read_value(),
            "10" => information.journal_number = self.read_value(),
            "20" => information.operation_description = self.read_value(),
            "21" | "22" | "23" | "24" | "25" | "TYT.:" => {
                information.operation_description.push_str(&self.read_value())
            }
            "26" => information.upload_date = Some(decode_date(&self.read_value())?),
            "27" | "28" => information.contragent_name.push_str(&self.read_value()),
            "29" | "60" => information.contragent_address.push_str(&self.read_value()),
            "30" => information.bank_code_of_payer = self.read_value(),
            "31" => information.account_id_of_payer = self.read_value(),
            "32" | "DLA:" => information.name_of_payer.push_str(&self.read_value()),
            "33" => information.address_of_payer = self.read_value(),
            "34" => {
                let value = self.read_value();
                information.text_key_addition = Some(value.parse().map_err(|_| {
                    Error::format(format!("дополнение ключа текста должно быть числом: '{}'", value))
                })?);
            }
            "38" => information.account_number_of_payer = self.read_value(),
            "61" | "62" | "63" | "REF. KLIENTA:" => self.read_remittance(information),
            _ => information
                .unstructured_remittance_information
                .push_str(&self.read_value()),
        }
        Ok(())
    }

    fn read_remittance(&mut self, information: &mut Information) {
        let identifier = self.reader.peek(REMITTANCE_IDENTIFIER_LEN);
        if let Some(remittance) = Remittance::from_identifier(identifier) {
            self.reader.skip(REMITTANCE_IDENTIFIER_LEN);
            let value = self.read_value();
            remittance.field(information).push_str(&value);
            self.last_remittance = Some(remittance);
            return;
        }

        // Без идентификатора: продолжение предыдущего подполя SEPA.
        let value = self.read_value();
        match self.last_remittance {
            Some(remittance) => {
                let field = remittance.field(information);
                if !field.is_empty() && !value.is_empty() {
                    field.push(' ');
                }
                field.push_str(&value);
            }
            None => information
                .unstructured_remittance_information
                .push_str(&value),
        }
    }

    /// Значение до следующего разделителя с нормализованными пробелами.
    fn read_value(&mut self) -> String {
        let raw = match self.separator {
            Some(separator) => self.reader.read_while(|c| c != separator, usize::MAX),
            None => self.reader.read_to_end(),
        };
        MULTI_SPACE.replace_all(raw.trim(), " ").into_owned()
    }
}

/// Разделителем может быть любой знак препинания или символ, но не буква,
/// цифра или пробел.
fn is_separator(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()
}
