//! Типы данных для представления выписок MT940.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Индикатор дебета/кредита.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebitCreditMark {
    /// Кредит (`C`).
    Credit,
    /// Дебет (`D`).
    Debit,
    /// Сторно кредита (`RC`).
    ReverseCredit,
    /// Сторно дебета (`RD`).
    ReverseDebit,
}

impl DebitCreditMark {
    /// Код индикатора в том виде, в каком он записан в MT940.
    pub fn code(self) -> &'static str {
        match self {
            DebitCreditMark::Credit => "C",
            DebitCreditMark::Debit => "D",
            DebitCreditMark::ReverseCredit => "RC",
            DebitCreditMark::ReverseDebit => "RD",
        }
    }

    /// true для поступлений (`C`) и сторно списаний (`RD`).
    pub fn is_credit(self) -> bool {
        matches!(
            self,
            DebitCreditMark::Credit | DebitCreditMark::ReverseDebit
        )
    }
}

impl FromStr for DebitCreditMark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(DebitCreditMark::Credit),
            "D" => Ok(DebitCreditMark::Debit),
            "RC" => Ok(DebitCreditMark::ReverseCredit),
            "RD" => Ok(DebitCreditMark::ReverseDebit),
            other => Err(Error::format(format!(
                "индикатор дебета/кредита должен быть 'C', 'D', 'RC' или 'RD', получено: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DebitCreditMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Вид баланса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceKind {
    /// Начальный баланс (`:60F:`).
    Opening,
    /// Промежуточный баланс (`:60M:`, `:62M:`).
    Intermediate,
    /// Конечный баланс (`:62F:`).
    Closing,
    /// Вид не задан: доступные балансы `:64:` и `:65:`.
    Available,
}

/// Баланс счета на дату.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Вид баланса.
    pub kind: BalanceKind,
    /// Индикатор дебета/кредита.
    pub mark: DebitCreditMark,
    /// Дата баланса.
    pub date: NaiveDate,
    /// Код валюты (EUR, PLN и т.д.).
    pub currency: String,
    /// Сумма баланса.
    pub amount: Decimal,
}

/// Информация для владельца счета (поле :86:).
///
/// Строковые поля по умолчанию пустые: банки переносят одно логическое
/// значение на несколько физических строк, и части дописываются в конец.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Information {
    pub transaction_code: Option<u32>,
    pub posting_text: String,
    pub journal_number: String,
    pub operation_description: String,
    pub upload_date: Option<NaiveDate>,
    pub contragent_name: String,
    pub contragent_address: String,
    pub bank_code_of_payer: String,
    pub account_id_of_payer: String,
    pub account_number_of_payer: String,
    pub name_of_payer: String,
    pub address_of_payer: String,
    pub text_key_addition: Option<i32>,
    /// `EREF+`
    pub end_to_end_reference: String,
    /// `KREF+`
    pub customer_reference: String,
    /// `MREF+`
    pub mandate_reference: String,
    /// `CRED+`
    pub creditor_reference: String,
    /// `DEBT+`
    pub originators_identification_code: String,
    /// `COAM+`
    pub compensation_amount: String,
    /// `OAMT+`
    pub original_amount: String,
    /// `SVWZ+`
    pub sepa_remittance_information: String,
    /// `ABWA+`
    pub payers_reference_party: String,
    /// `ABWE+`
    pub creditors_reference_party: String,
    pub unstructured_remittance_information: String,
}

/// Строка выписки (поле :61:).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    /// Дата валютирования.
    pub value_date: NaiveDate,
    /// Дата проводки, если банк ее указал.
    pub entry_date: Option<NaiveDate>,
    /// Индикатор дебета/кредита.
    pub mark: DebitCreditMark,
    /// Код средств.
    pub funds_code: Option<char>,
    /// Сумма без знака: направление задает `mark`.
    pub amount: Decimal,
    /// Код типа транзакции (NTRF, NMSC и т.д.).
    pub transaction_type_id_code: Option<String>,
    /// Референс клиента, до 16 символов.
    pub customer_reference: String,
    /// Референс банка, до 16 символов.
    pub bank_reference: Option<String>,
    /// Дополнительные сведения, до 34 символов.
    pub supplementary_details: Option<String>,
    /// Информация для владельца счета из следующего за строкой поля :86:.
    pub information: Option<Information>,
}

/// Выписка в формате MT940.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Референс выписки (поле :20:).
    pub transaction_reference_number: String,
    /// Связанный референс (поле :21:).
    pub related_reference: Option<String>,
    /// Идентификатор счета (поле :25:).
    pub account_identification: String,
    /// Номер выписки (поле :28C: или :13D:).
    pub statement_number: String,
    /// Начальный баланс (поле :60F: или :60M:).
    ///
    /// Отсутствует, если банк перешел от :25: или :28C: сразу к :61:.
    pub opening_balance: Option<Balance>,
    /// Строки выписки в порядке следования в документе.
    pub lines: Vec<StatementLine>,
    /// Конечный баланс (поле :62F: или :62M:).
    pub closing_balance: Option<Balance>,
    /// Доступный конечный баланс (поле :64:).
    pub closing_available_balance: Option<Balance>,
    /// Прогнозные доступные балансы (поля :65:).
    pub forward_available_balances: Vec<Balance>,
    /// Информация для владельца счета по выписке в целом.
    pub information: Option<Information>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_from_str() {
        assert_eq!("C".parse::<DebitCreditMark>().unwrap(), DebitCreditMark::Credit);
        assert_eq!("RD".parse::<DebitCreditMark>().unwrap(), DebitCreditMark::ReverseDebit);
        assert!(matches!("X".parse::<DebitCreditMark>(), Err(Error::Format(_))));
    }

    #[test]
    fn test_mark_display_and_direction() {
        assert_eq!(DebitCreditMark::ReverseCredit.to_string(), "RC");
        assert!(DebitCreditMark::ReverseDebit.is_credit());
        assert!(!DebitCreditMark::Debit.is_credit());
    }
}
