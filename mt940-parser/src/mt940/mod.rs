//! Модуль разбора формата MT940.
//!
//! MT940 - текстовый формат SWIFT для банковских выписок. Разбор устроен
//! в три слоя: последовательность тегов выписки, позиционная строка :61:
//! и подполя информации :86:.

pub mod balance;
pub mod date;
pub mod information;
pub mod line;
pub mod statement;

pub use balance::decode_balance;
pub use date::decode_date;
pub use information::decode_information;
pub use line::decode_statement_line;
pub use statement::{decode, decode_all, Decoder};
