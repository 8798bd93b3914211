//! Shareable project reports.

mod period;
mod project_report;
mod render;

pub use period::{PeriodRange, ReportPeriod};
pub use project_report::{ProjectReport, ReportLine, ReportOptions, TotalLine};
pub use render::{render, render_html, render_text, ReportFormat};
