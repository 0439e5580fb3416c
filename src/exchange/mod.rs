//! File import and export. Only inputs are read and only derived results are
//! written; the editable form itself is never saved.

pub mod file;

pub use file::{
    load_inputs_from_json, load_scope_items_from_csv, save_breakdown_to_csv,
    save_breakdown_to_json, save_placeholders_to_json,
};

use crate::validation::ValidationError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<ValidationError> for ExchangeError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.message().to_string())
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
