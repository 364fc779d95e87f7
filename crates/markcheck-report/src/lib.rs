//! markcheck-report — Presentation of exam reports.
//!
//! Renders an `ExamReport` as a self-contained HTML page or as CSV tables
//! suitable for spreadsheets.

pub mod csv;
pub mod html;

pub use csv::write_csv_reports;
pub use html::write_html_report;
