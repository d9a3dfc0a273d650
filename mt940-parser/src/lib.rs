//! # MT940 Parser
//!
//! Библиотека для разбора банковских выписок SWIFT MT940 в типизированную
//! модель данных.
//!
//! На вход подается уже нормализованный текст (известная кодировка,
//! переводы строк CRLF). Чтение файлов, перекодировка и сериализация
//! результата остаются на стороне вызывающего кода.
//!
//! ## Пример использования
//!
//! ```rust
//! use mt940_parser::decode;
//!
//! let text = ":20:REF\r\n:25:ACC\r\n:28C:1\r\n:60F:C240301EUR10,00\r\n\
//!             :61:240301C5,00NTRFINV1\r\n:62F:C240301EUR15,00\r\n-";
//!
//! for statement in decode(text) {
//!     let statement = statement?;
//!     assert_eq!(statement.lines.len(), 1);
//! }
//! # Ok::<(), mt940_parser::Error>(())
//! ```

pub mod error;
pub mod mt940;
pub mod reader;
pub mod types;

pub use error::{Error, Result};
pub use mt940::{
    decode, decode_all, decode_balance, decode_date, decode_information, decode_statement_line,
    Decoder,
};
pub use reader::TextReader;
pub use types::*;
