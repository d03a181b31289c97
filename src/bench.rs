//! Runs the four logical queries against a loaded collection.

use crate::error::BenchError;
use crate::layout::DocumentLayout;
use crate::report::{LogicalQuery, PreviewRow, QueryFailure, QueryReport, ReportSink, PREVIEW_ROWS};
use bench_store::{StoreError, UpdateSummary};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Times Q1-Q4 through a layout and hands each result to a sink.
///
/// Queries run once each, in order, without retries. The first failure
/// stops the bench unless `keep_going` is set, in which case the remaining
/// queries still run. Either way the first failure is returned once the
/// bench is done.
pub struct QueryBench<'a, L: DocumentLayout> {
    layout: &'a L,
    keep_going: bool,
}

struct Timed<T> {
    value: T,
    elapsed: Duration,
}

async fn timed<T, F>(operation: F) -> Result<Timed<T>, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    let start = Instant::now();
    let value = operation.await?;
    Ok(Timed {
        value,
        elapsed: start.elapsed(),
    })
}

fn preview<T>(rows: Vec<T>, wrap: impl Fn(T) -> PreviewRow) -> Vec<PreviewRow> {
    rows.into_iter().take(PREVIEW_ROWS).map(wrap).collect()
}

impl<'a, L: DocumentLayout> QueryBench<'a, L> {
    pub fn new(layout: &'a L) -> Self {
        Self {
            layout,
            keep_going: false,
        }
    }

    /// Run the remaining queries after a failure.
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Run Q1-Q4 and report each one to `sink`.
    pub async fn run(&self, sink: &mut dyn ReportSink) -> Result<Vec<QueryReport>, BenchError> {
        let layout = self.layout.kind();
        info!("Running queries against {} layout", layout);

        let mut reports = Vec::with_capacity(LogicalQuery::ALL.len());
        let mut first_failure = None;

        for query in LogicalQuery::ALL {
            match self.run_query(query).await {
                Ok(report) => {
                    sink.query_finished(&report)?;
                    reports.push(report);
                }
                Err(source) => {
                    let err = BenchError::QueryFailed {
                        query: query.label(),
                        source,
                    };
                    warn!("[{}] {}", layout, err);
                    sink.query_failed(&QueryFailure {
                        layout,
                        query,
                        message: err.to_string(),
                    })?;
                    if !self.keep_going {
                        return Err(err);
                    }
                    first_failure.get_or_insert(err);
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(reports),
        }
    }

    /// Run one query. Only the query itself is timed; the read-back that
    /// fills Q3 and Q4 previews is not.
    pub async fn run_query(&self, query: LogicalQuery) -> Result<QueryReport, StoreError> {
        let limit = PREVIEW_ROWS as i64;
        match query {
            LogicalQuery::EmployeeCompanies => {
                let rows = timed(self.layout.employee_companies()).await?;
                let count = rows.value.len() as u64;
                Ok(self.rows_report(
                    query,
                    rows.elapsed,
                    count,
                    preview(rows.value, PreviewRow::EmployeeCompany),
                ))
            }
            LogicalQuery::CompanyHeadcounts => {
                let rows = timed(self.layout.company_headcounts()).await?;
                let count = rows.value.len() as u64;
                Ok(self.rows_report(
                    query,
                    rows.elapsed,
                    count,
                    preview(rows.value, PreviewRow::Headcount),
                ))
            }
            LogicalQuery::NormalizeAges => {
                let summary = timed(self.layout.normalize_aged_people()).await?;
                let rows = self.layout.aged_people_preview(limit).await?;
                Ok(self.update_report(
                    query,
                    summary,
                    preview(rows, PreviewRow::AgedPerson),
                ))
            }
            LogicalQuery::SuffixCompanyNames => {
                let summary = timed(self.layout.suffix_company_names()).await?;
                let rows = self.layout.company_names_preview(limit).await?;
                Ok(self.update_report(
                    query,
                    summary,
                    preview(rows, |name| PreviewRow::CompanyName { name }),
                ))
            }
        }
    }

    fn rows_report(
        &self,
        query: LogicalQuery,
        elapsed: Duration,
        row_count: u64,
        preview: Vec<PreviewRow>,
    ) -> QueryReport {
        QueryReport {
            layout: self.layout.kind(),
            query,
            elapsed_secs: elapsed.as_secs_f64(),
            row_count,
            matched: None,
            modified: None,
            preview,
        }
    }

    fn update_report(
        &self,
        query: LogicalQuery,
        summary: Timed<UpdateSummary>,
        preview: Vec<PreviewRow>,
    ) -> QueryReport {
        QueryReport {
            layout: self.layout.kind(),
            query,
            elapsed_secs: summary.elapsed.as_secs_f64(),
            row_count: summary.value.modified,
            matched: Some(summary.value.matched),
            modified: Some(summary.value.modified),
            preview,
        }
    }
}
