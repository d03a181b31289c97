//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bench_core::{LayoutKind, Sex};
use bench_generator::{FakeValueProvider, RecordGenerator};
use bench_store::{
    DocumentStore, FindOptions, MemoryStore, StoreError, Update, UpdateSummary,
};
use bson::{Bson, Document};
use chrono::NaiveDate;
use docshape_bench::{
    load, BenchContext, BenchSettings, DocumentLayout, LoadMetrics, PartialSettings,
};
use std::collections::VecDeque;
use std::sync::Arc;

pub const COLLECTION: &str = "lab2_big_data";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Date of birth used once the scripted ones run out.
pub fn default_date_of_birth() -> NaiveDate {
    date(1990, 6, 15)
}

/// Provider returning scripted company names and birth dates, and unique
/// predictable values for everything else.
#[derive(Default)]
pub struct ScriptedProvider {
    company_names: VecDeque<String>,
    dates_of_birth: VecDeque<NaiveDate>,
    companies: u64,
    people: u64,
    emails: u64,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company_names(mut self, names: &[&str]) -> Self {
        self.company_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_dates_of_birth(mut self, dates: &[NaiveDate]) -> Self {
        self.dates_of_birth = dates.iter().copied().collect();
        self
    }
}

impl FakeValueProvider for ScriptedProvider {
    fn first_name(&mut self) -> String {
        format!("First{}", self.people)
    }

    fn full_name(&mut self) -> String {
        let name = format!("Person {}", self.people);
        self.people += 1;
        name
    }

    fn email(&mut self) -> String {
        self.emails += 1;
        format!("user{}@example.com", self.emails)
    }

    fn company_email(&mut self) -> String {
        self.emails += 1;
        format!("office{}@example.com", self.emails)
    }

    fn company_name(&mut self) -> String {
        let fallback = format!("Company {}", self.companies);
        self.companies += 1;
        self.company_names.pop_front().unwrap_or(fallback)
    }

    fn domain(&mut self) -> String {
        format!("company{}.com", self.companies)
    }

    fn url(&mut self) -> String {
        format!("https://www.company{}.com/", self.companies)
    }

    fn vat(&mut self) -> String {
        format!("IT{:08}", self.companies)
    }

    fn date_of_birth(&mut self, _min_age: u32, _max_age: u32, _today: NaiveDate) -> NaiveDate {
        self.dates_of_birth
            .pop_front()
            .unwrap_or_else(default_date_of_birth)
    }

    fn sex(&mut self) -> Sex {
        if self.people % 2 == 0 {
            Sex::Female
        } else {
            Sex::Male
        }
    }
}

pub fn settings(people: u64, companies: u64, batch_size: usize) -> BenchSettings {
    BenchSettings::resolve(
        None,
        PartialSettings {
            people_count: Some(people),
            company_count: Some(companies),
            batch_size: Some(batch_size),
            ..Default::default()
        },
    )
    .unwrap()
}

pub fn memory_context() -> (Arc<MemoryStore>, BenchContext) {
    let store = Arc::new(MemoryStore::new());
    let ctx = BenchContext::new(store.clone(), COLLECTION);
    (store, ctx)
}

pub async fn load_layout<L: DocumentLayout>(
    layout: &mut L,
    settings: &BenchSettings,
    provider: &mut dyn FakeValueProvider,
) -> LoadMetrics {
    load(layout, settings, &RecordGenerator::new(today()), provider)
        .await
        .unwrap()
}

/// Every stored person as a flat document, whatever the layout.
pub fn stored_people(store: &MemoryStore, layout: LayoutKind) -> Vec<Document> {
    let docs = store.documents(COLLECTION);
    match layout {
        LayoutKind::Referenced => docs
            .into_iter()
            .filter(|d| d.get_str("type").ok() == Some("person"))
            .collect(),
        LayoutKind::EmbeddedSingle => docs,
        LayoutKind::EmbeddedArray => docs
            .iter()
            .flat_map(|d| d.get_array("employees").unwrap().clone())
            .map(|e| match e {
                Bson::Document(e) => e,
                other => panic!("unexpected employee {other}"),
            })
            .collect(),
    }
}

/// Company names as stored, in storage order. For the embedded-single layout
/// this is every person's copy.
pub fn stored_company_names(store: &MemoryStore, layout: LayoutKind) -> Vec<String> {
    let docs = store.documents(COLLECTION);
    match layout {
        LayoutKind::Referenced => docs
            .iter()
            .filter(|d| d.get_str("type").ok() == Some("company"))
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect(),
        LayoutKind::EmbeddedSingle => docs
            .iter()
            .map(|d| {
                d.get_document("company")
                    .unwrap()
                    .get_str("name")
                    .unwrap()
                    .to_string()
            })
            .collect(),
        LayoutKind::EmbeddedArray => docs
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect(),
    }
}

/// Which store call a [`FailingStore`] breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failing {
    Drop,
    Aggregate,
    Find,
}

/// Store delegating to a [`MemoryStore`] except for one kind of call.
pub struct FailingStore {
    pub inner: MemoryStore,
    pub failing: Failing,
}

impl FailingStore {
    pub fn new(failing: Failing) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing,
        }
    }

    fn check(&self, call: Failing) -> Result<(), StoreError> {
        if self.failing == call {
            Err(StoreError::Rejected(format!("{call:?} unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.check(Failing::Drop)?;
        self.inner.drop_collection(name).await
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.inner.create_collection(name).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError> {
        self.inner.insert_many(collection, documents).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.check(Failing::Find)?;
        self.inner.find(collection, filter, options).await
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        self.check(Failing::Aggregate)?;
        self.inner.aggregate(collection, pipeline).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
    ) -> Result<UpdateSummary, StoreError> {
        self.inner.update_many(collection, filter, update).await
    }
}
