//! The daily HTML report.
//!
//! Grouping decides which section each record lands in; rendering turns the
//! groups into the page.

pub mod grouping;
pub mod render;

pub use grouping::{group, products, single_category, Grouped, ReportCounts, SingleCategory};
pub use render::{fill_template, render_page, render_row};

use crate::config::SourceUrls;
use crate::domain::{Result, UnifiedRecord};

/// Rendered page plus the counts shown on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub html: String,
    pub counts: ReportCounts,
}

/// Group and render `records`. Fails without output on an inconsistent record.
pub fn build_report(records: &[UnifiedRecord], urls: &SourceUrls, date: &str) -> Result<Report> {
    let grouped = group(records)?;
    let html = render_page(&grouped, urls, date)?;
    Ok(Report {
        html,
        counts: grouped.counts(),
    })
}
