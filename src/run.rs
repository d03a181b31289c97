//! Orchestration of a full run: store selection, load, queries, reporting.

use crate::bench::QueryBench;
use crate::context::BenchContext;
use crate::error::BenchError;
use crate::layout::{DocumentLayout, EmbeddedArrayLayout, EmbeddedSingleLayout, ReferencedLayout};
use crate::load::{load, LoadMetrics, LoadPlan};
use crate::logging::mask_connection_password;
use crate::report::{QueryReport, ReportSink};
use crate::settings::BenchSettings;
use crate::{LayoutSelection, StoreKind};
use bench_core::LayoutKind;
use bench_generator::{FakeValueProvider, RecordGenerator, SeededFakeProvider};
use bench_store::{DocumentStore, MemoryStore, MongoStore};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

/// Open the store a run will use.
pub async fn connect_store(
    kind: StoreKind,
    connection_string: &str,
    database: &str,
) -> Result<Arc<dyn DocumentStore>, BenchError> {
    match kind {
        StoreKind::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Mongodb => {
            info!(
                "Connecting to MongoDB at {} (database: {})",
                mask_connection_password(connection_string),
                database
            );
            let store = MongoStore::connect(connection_string, database)
                .await
                .map_err(BenchError::StoreUnavailable)?;
            Ok(Arc::new(store))
        }
    }
}

/// Everything a run needs besides the store and the sink.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub layouts: Vec<LayoutKind>,
    pub settings: BenchSettings,
    pub keep_going: bool,
    /// Date ages are derived against.
    pub today: NaiveDate,
}

impl RunOptions {
    pub fn new(selection: LayoutSelection, settings: BenchSettings, today: NaiveDate) -> Self {
        Self {
            layouts: selection.layouts(),
            settings,
            keep_going: false,
            today,
        }
    }

    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    fn generator(&self) -> RecordGenerator {
        RecordGenerator::new(self.today)
            .with_age_range(self.settings.min_age, self.settings.max_age)
    }
}

/// Plan every selected layout without touching the store.
pub fn plan(options: &RunOptions) -> Result<Vec<LoadPlan>, BenchError> {
    options
        .layouts
        .iter()
        .map(|&layout| LoadPlan::new(&options.settings, layout))
        .collect()
}

/// Load and query one layout.
pub async fn run_layout<L: DocumentLayout>(
    layout: &mut L,
    settings: &BenchSettings,
    generator: &RecordGenerator,
    provider: &mut dyn FakeValueProvider,
    keep_going: bool,
    sink: &mut dyn ReportSink,
) -> Result<(LoadMetrics, Vec<QueryReport>), BenchError> {
    let metrics = load(layout, settings, generator, provider).await?;
    sink.load_finished(&metrics)?;

    let reports = QueryBench::new(&*layout)
        .with_keep_going(keep_going)
        .run(sink)
        .await?;
    Ok((metrics, reports))
}

/// Run every selected layout in turn against `ctx`.
///
/// Each layout drops and regenerates the collection from the same seed, so
/// all layouts hold the same people and companies. A load failure stops the
/// run at once; a query failure stops it unless `keep_going` is set, and is
/// returned at the end otherwise.
pub async fn run_benchmark(
    ctx: &BenchContext,
    options: &RunOptions,
    sink: &mut dyn ReportSink,
) -> Result<Vec<QueryReport>, BenchError> {
    options.settings.validate()?;
    let generator = options.generator();

    let mut reports = Vec::new();
    let mut first_failure = None;

    for &kind in &options.layouts {
        let mut provider = SeededFakeProvider::new(options.settings.seed);
        let outcome = match kind {
            LayoutKind::Referenced => {
                let mut layout = ReferencedLayout::new(ctx.clone());
                run_layout(
                    &mut layout,
                    &options.settings,
                    &generator,
                    &mut provider,
                    options.keep_going,
                    sink,
                )
                .await
            }
            LayoutKind::EmbeddedSingle => {
                let mut layout = EmbeddedSingleLayout::new(ctx.clone());
                run_layout(
                    &mut layout,
                    &options.settings,
                    &generator,
                    &mut provider,
                    options.keep_going,
                    sink,
                )
                .await
            }
            LayoutKind::EmbeddedArray => {
                let mut layout = EmbeddedArrayLayout::new(ctx.clone());
                run_layout(
                    &mut layout,
                    &options.settings,
                    &generator,
                    &mut provider,
                    options.keep_going,
                    sink,
                )
                .await
            }
        };

        match outcome {
            Ok((_, layout_reports)) => reports.extend(layout_reports),
            Err(err @ BenchError::QueryFailed { .. }) if options.keep_going => {
                first_failure.get_or_insert(err);
            }
            Err(err) => return Err(err),
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(reports),
    }
}
