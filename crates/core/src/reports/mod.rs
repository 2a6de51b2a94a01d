//! Course report generation.
//!
//! Grade rows are first shaped into a [`TabularDocument`], then rendered:
//! - CSV for spreadsheets
//! - Paginated, styled A4 PDF for printing

mod csv_render;
mod error;
mod pdf_render;
mod service;
mod types;


pub use csv_render::render_csv;
pub use error::ReportError;
pub use pdf_render::{FIRST_PAGE_ROWS, PAGE_ROWS, paginate, render_pdf};
pub use service::ReportService;
pub use types::*;
