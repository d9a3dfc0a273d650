//! Разбор последовательности тегов выписки MT940.
//!
//! Разбор идет конечным автоматом: текст читается до ближайшего тега,
//! допустимого в текущем состоянии, прочитанный фрагмент присваивается
//! полю текущего состояния, а найденный тег определяет следующее
//! состояние.

use std::iter::FusedIterator;

use super::balance::decode_balance;
use super::information::decode_information;
use super::line::decode_statement_line;
use crate::error::{Error, Result};
use crate::reader::TextReader;
use crate::types::{Balance, BalanceKind, Information, Statement, StatementLine};

/// Теги, которые могут завершать фрагмент текста.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    RelatedReference,
    AccountIdentification,
    StatementNumber,
    DateTimeIndication,
    OpeningBalance,
    IntermediateOpeningBalance,
    StatementLine,
    Information,
    ClosingBalance,
    IntermediateClosingBalance,
    ClosingAvailableBalance,
    ForwardAvailableBalance,
    End,
}

impl Tag {
    fn marker(self) -> &'static str {
        match self {
            Tag::RelatedReference => ":21:",
            Tag::AccountIdentification => ":25:",
            Tag::StatementNumber => ":28C:",
            Tag::DateTimeIndication => ":13D:",
            Tag::OpeningBalance => ":60F:",
            Tag::IntermediateOpeningBalance => ":60M:",
            Tag::StatementLine => ":61:",
            Tag::Information => ":86:",
            Tag::ClosingBalance => ":62F:",
            Tag::IntermediateClosingBalance => ":62M:",
            Tag::ClosingAvailableBalance => ":64:",
            Tag::ForwardAvailableBalance => ":65:",
            Tag::End => "-",
        }
    }
}

const START_MARKER: &str = ":20:";

/// Состояние автомата: какое поле сейчас читается.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    TransactionReference,
    RelatedReference,
    AccountIdentification,
    StatementNumber,
    OpeningBalance(BalanceKind),
    StatementLine,
    LineInformation,
    ClosingBalance(BalanceKind),
    ClosingAvailableBalance,
    ForwardAvailableBalance,
    StatementInformation,
}

/// Переход автомата.
enum Step {
    Next(State),
    Done,
}

impl State {
    /// Теги, которыми может закончиться поле текущего состояния.
    fn lookahead(self) -> &'static [Tag] {
        match self {
            State::TransactionReference => &[Tag::RelatedReference, Tag::AccountIdentification],
            State::RelatedReference => &[Tag::AccountIdentification],
            State::AccountIdentification => &[
                Tag::StatementNumber,
                Tag::DateTimeIndication,
                Tag::StatementLine,
            ],
            State::StatementNumber => &[
                Tag::OpeningBalance,
                Tag::IntermediateOpeningBalance,
                Tag::StatementLine,
            ],
            State::OpeningBalance(_) => &[
                Tag::StatementLine,
                Tag::ClosingBalance,
                Tag::IntermediateClosingBalance,
            ],
            State::StatementLine => &[
                Tag::StatementLine,
                Tag::ClosingBalance,
                Tag::IntermediateClosingBalance,
                Tag::Information,
            ],
            State::LineInformation => &[
                Tag::StatementLine,
                Tag::ClosingBalance,
                Tag::IntermediateClosingBalance,
            ],
            State::ClosingBalance(_) => &[
                Tag::ClosingAvailableBalance,
                Tag::ForwardAvailableBalance,
                Tag::Information,
                Tag::End,
            ],
            State::ClosingAvailableBalance | State::ForwardAvailableBalance => &[
                Tag::ForwardAvailableBalance,
                Tag::Information,
                Tag::End,
            ],
            // Первый "-" считается концом выписки, даже внутри текста :86:.
            State::StatementInformation => &[Tag::End],
        }
    }

    /// Следующее состояние по найденному тегу. `None` означает, что текст
    /// закончился без тега.
    fn transition(self, tag: Option<Tag>) -> Result<Step> {
        let step = match (self, tag) {
            (State::TransactionReference, Some(Tag::RelatedReference)) => {
                Step::Next(State::RelatedReference)
            }
            (
                State::TransactionReference | State::RelatedReference,
                Some(Tag::AccountIdentification),
            ) => Step::Next(State::AccountIdentification),
            (
                State::AccountIdentification,
                Some(Tag::StatementNumber | Tag::DateTimeIndication),
            ) => Step::Next(State::StatementNumber),
            (State::StatementNumber, Some(Tag::OpeningBalance)) => {
                Step::Next(State::OpeningBalance(BalanceKind::Opening))
            }
            (State::StatementNumber, Some(Tag::IntermediateOpeningBalance)) => {
                Step::Next(State::OpeningBalance(BalanceKind::Intermediate))
            }
            (
                State::AccountIdentification
                | State::StatementNumber
                | State::OpeningBalance(_)
                | State::StatementLine
                | State::LineInformation,
                Some(Tag::StatementLine),
            ) => Step::Next(State::StatementLine),
            (State::StatementLine, Some(Tag::Information)) => Step::Next(State::LineInformation),
            (
                State::OpeningBalance(_) | State::StatementLine | State::LineInformation,
                Some(Tag::ClosingBalance),
            ) => Step::Next(State::ClosingBalance(BalanceKind::Closing)),
            (
                State::OpeningBalance(_) | State::StatementLine | State::LineInformation,
                Some(Tag::IntermediateClosingBalance),
            ) => Step::Next(State::ClosingBalance(BalanceKind::Intermediate)),
            (State::ClosingBalance(_), Some(Tag::ClosingAvailableBalance)) => {
                Step::Next(State::ClosingAvailableBalance)
            }
            (
                State::ClosingBalance(_)
                | State::ClosingAvailableBalance
                | State::ForwardAvailableBalance,
                Some(Tag::ForwardAvailableBalance),
            ) => Step::Next(State::ForwardAvailableBalance),
            (
                State::ClosingBalance(_)
                | State::ClosingAvailableBalance
                | State::ForwardAvailableBalance,
                Some(Tag::Information),
            ) => Step::Next(State::StatementInformation),
            (
                State::ClosingBalance(_)
                | State::ClosingAvailableBalance
                | State::ForwardAvailableBalance
                | State::StatementInformation,
                Some(Tag::End),
            ) => Step::Done,
            // Выписка может закончиться без "-" после любого из этих полей.
            (
                State::LineInformation
                | State::ClosingBalance(_)
                | State::ClosingAvailableBalance
                | State::ForwardAvailableBalance
                | State::StatementInformation,
                None,
            ) => Step::Done,
            (state, _) => return Err(state.unexpected_end()),
        };
        Ok(step)
    }

    fn unexpected_end(self) -> Error {
        let expected = match self {
            State::TransactionReference => "поле :20: должно продолжаться полем :21: или :25:",
            State::RelatedReference => "поле :21: должно продолжаться полем :25:",
            State::AccountIdentification => {
                "поле :25: должно продолжаться полем :28C:, :13D: или :61:"
            }
            State::StatementNumber => "поле :28C: должно продолжаться полем :60F:, :60M: или :61:",
            State::OpeningBalance(_) => {
                "поле :60a: должно продолжаться полем :61:, :62F: или :62M:"
            }
            State::StatementLine => {
                "поле :61: должно продолжаться полем :61:, :62F:, :62M: или :86:"
            }
            _ => "выписка оборвалась",
        };
        Error::structural(format!("данные выписки закончились неожиданно: {}", expected))
    }
}

/// Накопитель полей одной выписки. Живет в пределах одного вызова
/// [`Decoder::next`] и не разделяется между вызовами.
#[derive(Debug, Default)]
struct StatementBuilder {
    transaction_reference_number: String,
    related_reference: Option<String>,
    account_identification: String,
    statement_number: String,
    opening_balance: Option<Balance>,
    lines: Vec<StatementLine>,
    closing_balance: Option<Balance>,
    closing_available_balance: Option<Balance>,
    forward_available_balances: Vec<Balance>,
    information: Option<Information>,
}

impl StatementBuilder {
    /// Присваивает прочитанный фрагмент полю, соответствующему состоянию.
    fn assign(&mut self, state: State, value: &str) -> Result<()> {
        match state {
            State::TransactionReference => self.transaction_reference_number = value.to_string(),
            State::RelatedReference => self.related_reference = Some(value.to_string()),
            State::AccountIdentification => self.account_identification = value.to_string(),
            State::StatementNumber => self.statement_number = value.to_string(),
            State::OpeningBalance(kind) => self.opening_balance = Some(decode_balance(value, kind)?),
            // Строка разбирается сразу, чтобы сохранить порядок строк.
            State::StatementLine => self.lines.push(decode_statement_line(value)?),
            State::LineInformation => {
                let line = self.lines.last_mut().ok_or_else(|| {
                    Error::structural("полю :86: должно предшествовать поле :61:")
                })?;
                line.information = Some(decode_information(value)?);
            }
            State::ClosingBalance(kind) => self.closing_balance = Some(decode_balance(value, kind)?),
            State::ClosingAvailableBalance => {
                self.closing_available_balance =
                    Some(decode_balance(value, BalanceKind::Available)?)
            }
            State::ForwardAvailableBalance => self
                .forward_available_balances
                .push(decode_balance(value, BalanceKind::Available)?),
            State::StatementInformation => self.information = Some(decode_information(value)?),
        }
        Ok(())
    }

    fn build(self) -> Statement {
        Statement {
            transaction_reference_number: self.transaction_reference_number,
            related_reference: self.related_reference,
            account_identification: self.account_identification,
            statement_number: self.statement_number,
            opening_balance: self.opening_balance,
            lines: self.lines,
            closing_balance: self.closing_balance,
            closing_available_balance: self.closing_available_balance,
            forward_available_balances: self.forward_available_balances,
            information: self.information,
        }
    }
}

/// Ленивая последовательность выписок из текста MT940.
///
/// Каждый вызов `next` разбирает одну выписку. Последовательность
/// заканчивается, когда в оставшемся тексте нет тега `:20:`, либо после
/// первой ошибки.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    reader: TextReader<'a>,
    exhausted: bool,
}

impl<'a> Decoder<'a> {
    /// Создает декодер поверх нормализованного текста.
    pub fn new(text: &'a str) -> Self {
        Self {
            reader: TextReader::new(text),
            exhausted: false,
        }
    }

    fn read_statement(&mut self) -> Result<Option<Statement>> {
        if !self.reader.seek_past(START_MARKER) {
            tracing::debug!("Тег :20: не найден, выписок больше нет");
            return Ok(None);
        }

        let mut builder = StatementBuilder::default();
        let mut state = State::TransactionReference;

        loop {
            let tags = state.lookahead();
            let (chunk, found) = self.reader.read_to(tags.iter().map(|tag| tag.marker()));
            let tag = found.map(|idx| tags[idx]);

            builder.assign(state, chunk.trim())?;

            match state.transition(tag)? {
                Step::Next(next) => {
                    tracing::trace!(?state, ?next, "переход по тегу");
                    state = next;
                }
                Step::Done => break,
            }
        }

        let statement = builder.build();
        tracing::debug!(
            reference = %statement.transaction_reference_number,
            lines = statement.lines.len(),
            "Выписка разобрана"
        );
        Ok(Some(statement))
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.read_statement() {
            Ok(Some(statement)) => Some(Ok(statement)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Decoder<'_> {}

/// Возвращает ленивую последовательность выписок из текста.
pub fn decode(text: &str) -> Decoder<'_> {
    Decoder::new(text)
}

/// Разбирает все выписки из текста, останавливаясь на первой ошибке.
pub fn decode_all(text: &str) -> Result<Vec<Statement>> {
    decode(text).collect()
}
