//! Grade ingestion pipeline.
//!
//! This module provides business logic for grade records including:
//! - Decoding uploaded CSV and workbook files into sheets
//! - Mapping loosely named headers to canonical columns
//! - Per-row validation with row-numbered errors
//! - Idempotent upsert through a [`GradeStore`]

mod columns;
mod error;
mod service;
mod sheet;
mod types;


pub use columns::{ColumnMap, GradeField, classify_header, normalize_header};
pub use error::{IngestError, SheetError, StoreError};
pub use service::{GradeIngestService, GradeStore, MAX_TERM_LABEL_LEN, ManualGradeEntry};
pub use sheet::{Sheet, SheetFormat, SheetRow};
pub use types::{
    GradeKey, GradeUpsert, IngestResult, IngestTarget, InvalidGrade, LetterGrade,
    PercentageError, RowError, RowErrorKind, UpsertOutcome, parse_percentage,
};
