//! Чтение входных данных: JSON-запрос и таблица операций в CSV.

mod csv_parser;

use std::io::Read;

use crate::error::LoadError;
use crate::model::StatementRequest;

pub use csv_parser::read_transactions_csv;

impl StatementRequest {
    /// Разбирает JSON вида `{"accountInfo": {...}, "transactions": [...]}`.
    ///
    /// Лишние поля игнорируются, отсутствующие части остаются `None`.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(raw)?)
    }
}
