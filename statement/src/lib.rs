//! Генерация PDF-выписок по счёту.
//!
//! Вход - реквизиты счёта и список операций, выход - готовый PDF с именем файла.
//! Конвейер: [`normalize`] -> [`layout`] -> [`render`], собирает его [`StatementAssembler`].

pub mod assembler;
pub mod config;
pub mod error;
pub mod input;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod render;

pub use crate::assembler::{StatementAssembler, build_view, generate_statement};
pub use crate::config::StatementConfig;
pub use crate::error::{InputError, LoadError, RenderError, StatementError};
pub use crate::input::read_transactions_csv;
pub use crate::model::{AccountInfo, FieldValue, RenderedDocument, StatementRequest, TransactionRecord};
pub use crate::render::{Backend, DocumentRenderer, FileNaming};
