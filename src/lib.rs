//! Document-shape benchmark.
//!
//! Generates Person and Company records, stores them in MongoDB under one of
//! three layouts and times the same four logical queries against each:
//!
//! - Referenced: separate company and person documents linked by
//!   `company_id`, told apart by a `type` field
//! - EmbeddedSingle: person documents each carrying a copy of their company
//! - EmbeddedArray: company documents each carrying an `employees` array
//!
//! # Phases
//!
//! ```text
//! distribute_employees → RecordGenerator → DocumentLayout → BatchWriter → DocumentStore
//!                                            (load)
//! QueryBench → DocumentLayout → DocumentStore → ReportSink
//!                                            (queries)
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # All three layouts against a local MongoDB
//! docshape-bench run --layout all
//!
//! # A small run without MongoDB, with a JSON report
//! docshape-bench run --store memory --people-count 1000 --company-count 10 \
//!   --report-json report.jsonl
//! ```

use bench_core::LayoutKind;
use clap::ValueEnum;

pub mod bench;
pub mod context;
pub mod error;
pub mod layout;
pub mod load;
pub mod logging;
pub mod report;
pub mod run;
pub mod settings;
pub mod writer;

pub use bench::QueryBench;
pub use context::BenchContext;
pub use error::BenchError;
pub use layout::{
    AgedPerson, CompanyHeadcount, DocumentLayout, EmbeddedArrayLayout, EmbeddedSingleLayout,
    EmployeeCompany, ReferencedLayout,
};
pub use load::{load, LoadMetrics, LoadPlan};
pub use report::{
    CollectingSink, FanoutSink, JsonLinesSink, LogicalQuery, PreviewRow, QueryFailure,
    QueryReport, ReportSink, TracingSink, PREVIEW_ROWS,
};
pub use settings::{BenchSettings, PartialSettings};
pub use writer::{BatchWriter, WriteStats};

/// Which layouts a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutSelection {
    Referenced,
    EmbeddedSingle,
    EmbeddedArray,
    /// All three, one after the other.
    All,
}

impl LayoutSelection {
    pub fn layouts(self) -> Vec<LayoutKind> {
        match self {
            LayoutSelection::Referenced => vec![LayoutKind::Referenced],
            LayoutSelection::EmbeddedSingle => vec![LayoutKind::EmbeddedSingle],
            LayoutSelection::EmbeddedArray => vec![LayoutKind::EmbeddedArray],
            LayoutSelection::All => LayoutKind::ALL.to_vec(),
        }
    }
}

/// Document store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// MongoDB reached through the official driver
    #[value(name = "mongodb")]
    Mongodb,
    /// In-process store, nothing persisted
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_selection() {
        assert_eq!(LayoutSelection::All.layouts().len(), 3);
        assert_eq!(
            LayoutSelection::EmbeddedSingle.layouts(),
            vec![LayoutKind::EmbeddedSingle]
        );
        assert_eq!(
            LayoutSelection::from_str("embedded-array", true).unwrap(),
            LayoutSelection::EmbeddedArray
        );
    }
}
