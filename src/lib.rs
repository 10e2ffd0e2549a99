// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]

//! # pdf_report
//!
//! Business report PDFs from code or JSON: branded page headers, cover pages,
//! section headings, paragraphs, images, charts and striped tables.
//!
//! ## Layers
//!
//! - **writer**: PDF objects, content streams, standard-14 font metrics,
//!   image XObjects and the file serializer
//! - **layout**: a cursor-based [`Canvas`](layout::Canvas) in millimetres
//!   with automatic page breaks, and [`Figure`](layout::Figure) blocks for
//!   vector drawings
//! - **chart**: bar, pie, line and histogram charts drawn into figures
//! - **report**: [`ReportGenerator`], the report building blocks
//! - **definition**: [`ReportDefinition`], reports described in JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_report::{ReportConfig, ReportGenerator};
//!
//! # fn main() -> pdf_report::Result<()> {
//! let config = ReportConfig::new()
//!     .with_report_name("census")
//!     .with_title("ACME - Pet census");
//! let mut report = ReportGenerator::new(config)?;
//! report.add_page()?;
//! report.create_cover_page("Pet census")?;
//! report.create_section_heading("Counts")?;
//! report.create_paragraph("Cats lead dogs for the third year running.")?;
//! report.add_pie_chart("Pets", &["Cat", "Dog", "Bird"], &[5.0, 4.0, 2.0])?;
//! report.create_table(&[vec!["Cat", "5"], vec!["Dog", "4"]], &["Pet", "Count"])?;
//! report.save()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Units and colours
pub mod geometry;

// PDF writing
pub mod writer;

// Page layout
pub mod layout;

// Charts
pub mod chart;

// Report building
pub mod definition;
pub mod report;

// Re-exports
pub use chart::{BarGraph, Chart, ChartStyle, FigureSize, Histogram, LineChart, PieChart};
pub use config::{Margins, PageSize, ReportConfig};
pub use definition::{Block, ReportDefinition};
pub use error::{Error, Result};
pub use geometry::Color;
pub use report::{ReportGenerator, TableStyle};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // VERSION is populated from CARGO_PKG_VERSION at compile time
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pdf_report");
    }
}
