//! Модуль обработки ошибок библиотеки.

use thiserror::Error;

/// Основной тип ошибки библиотеки.
///
/// Оба варианта не допускают восстановления: разбор текущей выписки
/// прерывается, а ошибка передается вызывающему коду.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Нарушена последовательность тегов либо обязательное поле
    /// фиксированной длины отсутствует или обрезано.
    #[error("Нарушена структура данных: {0}")]
    Structural(String),
    /// Содержимое поля не соответствует ожидаемому формату.
    #[error("Неверный формат: {0}")]
    Format(String),
}

impl Error {
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        Error::Structural(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}

/// Тип Result с ошибкой библиотеки.
pub type Result<T> = std::result::Result<T, Error>;
