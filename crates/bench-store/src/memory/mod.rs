//! In-process document store.
//!
//! Collections are plain vectors of BSON documents kept in insertion order.
//! Filters, projections, pipelines and updates are interpreted for the
//! operator subset the benchmark layouts emit; anything else is reported as
//! [`StoreError::Unsupported`] instead of being silently ignored.

pub mod expr;
pub mod filter;
pub mod path;
pub mod pipeline;
pub mod update;

use crate::error::StoreError;
use crate::store::{DocumentStore, FindOptions, Update, UpdateSummary};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Document store living entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    insert_calls: AtomicUsize,
    reject_insert_call: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`-th `insert_many` call (0-based), accepting all others.
    ///
    /// Used to exercise partial-load failures.
    pub fn rejecting_insert_call(mut self, n: usize) -> Self {
        self.reject_insert_call = Some(n);
        self
    }

    /// Number of documents currently stored in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Snapshot of every document in `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.lock().remove(name);
        Ok(())
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut collections = self.lock();
        if collections.contains_key(name) {
            return Err(StoreError::CollectionExists(name.to_string()));
        }
        collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError> {
        let call = self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_insert_call == Some(call) {
            return Err(StoreError::Rejected(format!(
                "insert_many call {call} rejected"
            )));
        }

        let mut ids = Vec::with_capacity(documents.len());
        let mut prepared = Vec::with_capacity(documents.len());
        for document in documents {
            let (id, document) = match document.get("_id") {
                Some(id) => (id.clone(), document),
                None => {
                    let id = Bson::ObjectId(ObjectId::new());
                    let mut with_id = Document::new();
                    with_id.insert("_id", id.clone());
                    with_id.extend(document);
                    (id, with_id)
                }
            };
            ids.push(id);
            prepared.push(document);
        }

        self.lock()
            .entry(collection.to_string())
            .or_default()
            .extend(prepared);
        Ok(ids)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for doc in docs {
            if filter::matches(doc, &filter)? {
                found.push(doc.clone());
            }
        }
        drop(collections);

        if let Some(sort) = &options.sort {
            pipeline::sort(&mut found, sort);
        }
        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            found.truncate(limit as usize);
        }
        match &options.projection {
            Some(projection) => found
                .iter()
                .map(|doc| pipeline::project(doc, projection))
                .collect(),
            None => Ok(found),
        }
    }

    async fn aggregate(
        &self,
        collection: &str,
        stages: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock();
        let input = collections.get(collection).cloned().unwrap_or_default();
        pipeline::run(&collections, input, &stages)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
    ) -> Result<UpdateSummary, StoreError> {
        let mut collections = self.lock();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(UpdateSummary::default());
        };

        let mut summary = UpdateSummary::default();
        for doc in docs.iter_mut() {
            if !filter::matches(doc, &filter)? {
                continue;
            }
            summary.matched += 1;
            if update::apply(doc, &update)? {
                summary.modified += 1;
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_ids_in_order() {
        let store = MemoryStore::new();
        let ids = store
            .insert_many("c", vec![doc! { "n": 1 }, doc! { "_id": 7, "n": 2 }])
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert!(matches!(ids[0], Bson::ObjectId(_)));
        assert_eq!(ids[1], Bson::Int32(7));

        let docs = store.documents("c");
        assert_eq!(docs[0].keys().next().map(String::as_str), Some("_id"));
    }

    #[tokio::test]
    async fn test_create_twice_fails_and_drop_clears() {
        let store = MemoryStore::new();
        store.create_collection("c").await.unwrap();
        assert!(matches!(
            store.create_collection("c").await,
            Err(StoreError::CollectionExists(_))
        ));

        store.insert_many("c", vec![doc! { "n": 1 }]).await.unwrap();
        store.drop_collection("c").await.unwrap();
        assert!(store.is_empty("c"));
        store.drop_collection("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_find_with_projection_and_limit() {
        let store = MemoryStore::new();
        let docs = (0..5).map(|n| doc! { "n": n, "even": n % 2 == 0 }).collect();
        store.insert_many("c", docs).await.unwrap();

        let found = store
            .find(
                "c",
                doc! { "even": true },
                FindOptions::default()
                    .projection(doc! { "_id": 0, "n": 1 })
                    .sort(doc! { "n": -1 })
                    .limit(2),
            )
            .await
            .unwrap();
        assert_eq!(found, vec![doc! { "n": 4 }, doc! { "n": 2 }]);
    }

    #[tokio::test]
    async fn test_update_many_counts() {
        let store = MemoryStore::new();
        let docs = vec![doc! { "age": 40 }, doc! { "age": 30 }, doc! { "age": 20 }];
        store.insert_many("c", docs).await.unwrap();

        let summary = store
            .update_many(
                "c",
                doc! { "age": { "$lt": 35 } },
                Update::Operators(doc! { "$set": { "age": 30 } }),
            )
            .await
            .unwrap();
        assert_eq!(summary, UpdateSummary { matched: 2, modified: 1 });
    }

    #[tokio::test]
    async fn test_rejected_insert_keeps_earlier_batches() {
        let store = MemoryStore::new().rejecting_insert_call(1);
        store.insert_many("c", vec![doc! { "n": 1 }]).await.unwrap();
        let err = store.insert_many("c", vec![doc! { "n": 2 }]).await;
        assert!(matches!(err, Err(StoreError::Rejected(_))));
        assert_eq!(store.len("c"), 1);
    }

    #[tokio::test]
    async fn test_missing_collection_reads_empty() {
        let store = MemoryStore::new();
        assert!(store
            .aggregate("nope", vec![doc! { "$match": {} }])
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .find("nope", doc! {}, FindOptions::default())
            .await
            .unwrap()
            .is_empty());
    }
}
