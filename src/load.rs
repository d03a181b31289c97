//! The load phase: generate companies and people and write them through a
//! layout.

use crate::error::BenchError;
use crate::layout::DocumentLayout;
use crate::settings::BenchSettings;
use crate::writer::BatchWriter;
use bench_core::{distribute_employees, Company, LayoutKind};
use bench_generator::{FakeValueProvider, RecordGenerator};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Metrics from a load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadMetrics {
    pub layout: LayoutKind,
    /// Companies generated.
    pub companies: u64,
    /// People generated.
    pub persons: u64,
    /// Documents accepted by the store.
    pub documents_written: u64,
    /// Batches flushed.
    pub batches: u64,
    /// Total time taken, generation included.
    pub elapsed: Duration,
}

impl LoadMetrics {
    /// Calculate documents per second.
    pub fn documents_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.documents_written as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// What a load will do, computed without touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub layout: LayoutKind,
    pub people: u64,
    pub companies: u64,
    /// Employees every company gets at least.
    pub base_employees: u64,
    /// Leading companies that get one more employee than the base.
    pub companies_with_extra: u64,
    pub batch_size: usize,
    /// Documents the collection will hold afterwards.
    pub expected_documents: u64,
}

impl LoadPlan {
    pub fn new(settings: &BenchSettings, layout: LayoutKind) -> Result<Self, BenchError> {
        let counts = distribute_employees(settings.people_count, settings.company_count)?;
        let base_employees = counts.last().copied().unwrap_or_default();
        let companies_with_extra = counts.iter().filter(|&&c| c > base_employees).count() as u64;

        let expected_documents = match layout {
            LayoutKind::Referenced => settings.people_count + settings.company_count,
            LayoutKind::EmbeddedSingle => settings.people_count,
            LayoutKind::EmbeddedArray => settings.company_count,
        };

        Ok(Self {
            layout,
            people: settings.people_count,
            companies: settings.company_count,
            base_employees,
            companies_with_extra,
            batch_size: settings.batch_size_for(layout),
            expected_documents,
        })
    }
}

/// Drop and recreate the collection, then load it through `layout`.
///
/// Companies are generated first, in order. Each company's employees are
/// then generated in chunks of at most the batch size and handed to the
/// layout, so no more than one chunk of people is held at a time. A rejected
/// batch stops the load; batches already written stay in the collection.
pub async fn load<L: DocumentLayout>(
    layout: &mut L,
    settings: &BenchSettings,
    generator: &RecordGenerator,
    provider: &mut dyn FakeValueProvider,
) -> Result<LoadMetrics, BenchError> {
    let start_time = Instant::now();
    let ctx = layout.context().clone();
    let kind = layout.kind();
    let batch_size = settings.batch_size_for(kind);
    let counts = distribute_employees(settings.people_count, settings.company_count)?;

    info!("Dropping collection: {}", ctx.collection);
    ctx.store
        .drop_collection(&ctx.collection)
        .await
        .map_err(BenchError::StoreUnavailable)?;
    ctx.store
        .create_collection(&ctx.collection)
        .await
        .map_err(BenchError::StoreUnavailable)?;

    info!(
        "Loading {} persons across {} companies into '{}' ({} layout, batch size: {})",
        settings.people_count, settings.company_count, ctx.collection, kind, batch_size
    );

    let companies: Vec<Company> = counts.iter().map(|_| generator.company(provider)).collect();
    let mut writer = BatchWriter::new(ctx.clone(), batch_size);
    let handles = layout.store_companies(&mut writer, companies).await?;
    if handles.len() != counts.len() {
        return Err(BenchError::InconsistentReference(format!(
            "{} companies generated but {} stored",
            counts.len(),
            handles.len()
        )));
    }
    debug!("{} companies stored", handles.len());

    let mut persons = 0u64;
    let mut reported_batches = writer.stats().batches;
    for (mut handle, count) in handles.into_iter().zip(counts) {
        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(batch_size as u64);
            let batch = (0..chunk).map(|_| generator.person(provider)).collect();
            layout
                .store_person_batch(&mut writer, &mut handle, batch)
                .await?;
            remaining -= chunk;
            persons += chunk;
        }
        layout.close_company(&mut writer, handle).await?;

        let stats = writer.stats();
        if stats.batches != reported_batches {
            reported_batches = stats.batches;
            info!(
                "{} / {} persons inserted ({} documents written)",
                stats.persons, settings.people_count, stats.documents
            );
        }
    }

    let stats = writer.finish().await?;
    let metrics = LoadMetrics {
        layout: kind,
        companies: settings.company_count,
        persons,
        documents_written: stats.documents,
        batches: stats.batches,
        elapsed: start_time.elapsed(),
    };

    info!(
        "Finished - {} persons in {:.2}s ({:.0} docs/s)",
        metrics.persons,
        metrics.elapsed.as_secs_f64(),
        metrics.documents_per_second()
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PartialSettings;

    fn settings(people: u64, companies: u64) -> BenchSettings {
        BenchSettings::resolve(
            None,
            PartialSettings {
                people_count: Some(people),
                company_count: Some(companies),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_plan() {
        let plan = LoadPlan::new(&settings(10, 3), LayoutKind::Referenced).unwrap();
        assert_eq!(plan.base_employees, 3);
        assert_eq!(plan.companies_with_extra, 1);
        assert_eq!(plan.expected_documents, 13);
        assert_eq!(plan.batch_size, 2_000);

        let plan = LoadPlan::new(&settings(10, 3), LayoutKind::EmbeddedArray).unwrap();
        assert_eq!(plan.expected_documents, 3);
        assert_eq!(plan.batch_size, 100);
    }

    #[test]
    fn test_plan_even_split_has_no_extra() {
        let plan = LoadPlan::new(&settings(9, 3), LayoutKind::EmbeddedSingle).unwrap();
        assert_eq!(plan.base_employees, 3);
        assert_eq!(plan.companies_with_extra, 0);
        assert_eq!(plan.expected_documents, 9);
    }

    #[test]
    fn test_metrics_rate() {
        let metrics = LoadMetrics {
            layout: LayoutKind::Referenced,
            companies: 1,
            persons: 99,
            documents_written: 100,
            batches: 1,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(metrics.documents_per_second(), 50.0);
        let instant = LoadMetrics {
            elapsed: Duration::ZERO,
            ..metrics
        };
        assert_eq!(instant.documents_per_second(), 0.0);
    }
}
