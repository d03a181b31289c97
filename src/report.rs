//! Reporting sinks for load metrics and query results.

use crate::error::BenchError;
use crate::layout::{AgedPerson, CompanyHeadcount, EmployeeCompany};
use crate::load::LoadMetrics;
use bench_core::LayoutKind;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use tracing::{info, warn};

/// Rows kept per query for display.
pub const PREVIEW_ROWS: usize = 10;

/// The four logical queries, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalQuery {
    #[serde(rename = "Q1")]
    EmployeeCompanies,
    #[serde(rename = "Q2")]
    CompanyHeadcounts,
    #[serde(rename = "Q3")]
    NormalizeAges,
    #[serde(rename = "Q4")]
    SuffixCompanyNames,
}

impl LogicalQuery {
    pub const ALL: [LogicalQuery; 4] = [
        LogicalQuery::EmployeeCompanies,
        LogicalQuery::CompanyHeadcounts,
        LogicalQuery::NormalizeAges,
        LogicalQuery::SuffixCompanyNames,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LogicalQuery::EmployeeCompanies => "Q1",
            LogicalQuery::CompanyHeadcounts => "Q2",
            LogicalQuery::NormalizeAges => "Q3",
            LogicalQuery::SuffixCompanyNames => "Q4",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LogicalQuery::EmployeeCompanies => "employee names with company names",
            LogicalQuery::CompanyHeadcounts => "employee count per company",
            LogicalQuery::NormalizeAges => "age set to 30 for people born before 1988",
            LogicalQuery::SuffixCompanyNames => "\" Company\" appended to company names",
        }
    }
}

impl fmt::Display for LogicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One preview row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PreviewRow {
    EmployeeCompany(EmployeeCompany),
    Headcount(CompanyHeadcount),
    AgedPerson(AgedPerson),
    CompanyName { name: String },
}

impl fmt::Display for PreviewRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewRow::EmployeeCompany(row) => {
                write!(f, "{:<32} {}", row.full_name, row.company_name)
            }
            PreviewRow::Headcount(row) => write!(f, "{:<40} {}", row.company_name, row.employees),
            PreviewRow::AgedPerson(row) => {
                write!(f, "{:<32} {} {}", row.full_name, row.date_of_birth, row.age)
            }
            PreviewRow::CompanyName { name } => f.write_str(name),
        }
    }
}

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub layout: LayoutKind,
    pub query: LogicalQuery,
    pub elapsed_secs: f64,
    /// Rows returned (Q1, Q2) or documents modified (Q3, Q4).
    pub row_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
    /// At most [`PREVIEW_ROWS`] rows.
    pub preview: Vec<PreviewRow>,
}

/// A query that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFailure {
    pub layout: LayoutKind,
    pub query: LogicalQuery,
    pub message: String,
}

/// Receives structured results as a run progresses.
pub trait ReportSink: Send {
    fn load_finished(&mut self, metrics: &LoadMetrics) -> Result<(), BenchError>;

    fn query_finished(&mut self, report: &QueryReport) -> Result<(), BenchError>;

    fn query_failed(&mut self, failure: &QueryFailure) -> Result<(), BenchError>;
}

/// Writes results as log lines.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn load_finished(&mut self, metrics: &LoadMetrics) -> Result<(), BenchError> {
        info!(
            "[{}] Loaded {} persons / {} companies: {} documents in {} batches, {:.2}s ({:.0} docs/s)",
            metrics.layout,
            metrics.persons,
            metrics.companies,
            metrics.documents_written,
            metrics.batches,
            metrics.elapsed.as_secs_f64(),
            metrics.documents_per_second()
        );
        Ok(())
    }

    fn query_finished(&mut self, report: &QueryReport) -> Result<(), BenchError> {
        info!(
            "[{}] {} ({}): {} rows in {:.4}s",
            report.layout,
            report.query,
            report.query.description(),
            report.row_count,
            report.elapsed_secs
        );
        for row in &report.preview {
            info!("    {}", row);
        }
        Ok(())
    }

    fn query_failed(&mut self, failure: &QueryFailure) -> Result<(), BenchError> {
        warn!("[{}] {} failed: {}", failure.layout, failure.query, failure.message);
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Load {
        layout: LayoutKind,
        companies: u64,
        persons: u64,
        documents_written: u64,
        batches: u64,
        elapsed_secs: f64,
        documents_per_second: f64,
    },
    Query(&'a QueryReport),
    Failure(&'a QueryFailure),
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, event: &Event<'_>) -> Result<(), BenchError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> ReportSink for JsonLinesSink<W> {
    fn load_finished(&mut self, metrics: &LoadMetrics) -> Result<(), BenchError> {
        self.emit(&Event::Load {
            layout: metrics.layout,
            companies: metrics.companies,
            persons: metrics.persons,
            documents_written: metrics.documents_written,
            batches: metrics.batches,
            elapsed_secs: metrics.elapsed.as_secs_f64(),
            documents_per_second: metrics.documents_per_second(),
        })
    }

    fn query_finished(&mut self, report: &QueryReport) -> Result<(), BenchError> {
        self.emit(&Event::Query(report))
    }

    fn query_failed(&mut self, failure: &QueryFailure) -> Result<(), BenchError> {
        self.emit(&Event::Failure(failure))
    }
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub loads: Vec<LoadMetrics>,
    pub reports: Vec<QueryReport>,
    pub failures: Vec<QueryFailure>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The report for `query` under `layout`, if it succeeded.
    pub fn report(&self, layout: LayoutKind, query: LogicalQuery) -> Option<&QueryReport> {
        self.reports
            .iter()
            .find(|r| r.layout == layout && r.query == query)
    }
}

impl ReportSink for CollectingSink {
    fn load_finished(&mut self, metrics: &LoadMetrics) -> Result<(), BenchError> {
        self.loads.push(metrics.clone());
        Ok(())
    }

    fn query_finished(&mut self, report: &QueryReport) -> Result<(), BenchError> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn query_failed(&mut self, failure: &QueryFailure) -> Result<(), BenchError> {
        self.failures.push(failure.clone());
        Ok(())
    }
}

/// Forwards every event to each inner sink.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ReportSink for FanoutSink {
    fn load_finished(&mut self, metrics: &LoadMetrics) -> Result<(), BenchError> {
        self.sinks
            .iter_mut()
            .try_for_each(|s| s.load_finished(metrics))
    }

    fn query_finished(&mut self, report: &QueryReport) -> Result<(), BenchError> {
        self.sinks
            .iter_mut()
            .try_for_each(|s| s.query_finished(report))
    }

    fn query_failed(&mut self, failure: &QueryFailure) -> Result<(), BenchError> {
        self.sinks
            .iter_mut()
            .try_for_each(|s| s.query_failed(failure))
    }
}
