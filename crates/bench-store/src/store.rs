//! The document store boundary.

use crate::error::StoreError;
use async_trait::async_trait;
use bson::{Bson, Document};
use mongodb::options::UpdateModifications;

/// Options for [`DocumentStore::find`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An update applied by [`DocumentStore::update_many`].
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Operator document such as `{ "$set": { "age": 30 } }`.
    Operators(Document),
    /// Aggregation-pipeline update such as
    /// `[{ "$set": { "name": { "$concat": ["$name", " Company"] } } }]`.
    Pipeline(Vec<Document>),
}

impl From<Update> for UpdateModifications {
    fn from(update: Update) -> Self {
        match update {
            Update::Operators(doc) => UpdateModifications::Document(doc),
            Update::Pipeline(stages) => UpdateModifications::Pipeline(stages),
        }
    }
}

/// Counts reported by an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub matched: u64,
    pub modified: u64,
}

impl std::ops::AddAssign for UpdateSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.matched += rhs.matched;
        self.modified += rhs.modified;
    }
}

/// Operations the benchmark needs from a document database.
///
/// Every call blocks the caller until the store answers; there is no
/// cancellation and no internal timeout.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Drop a collection. Dropping a missing collection is not an error.
    async fn drop_collection(&self, name: &str) -> Result<(), StoreError>;

    async fn create_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Insert documents and return their `_id`s in input order.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
    ) -> Result<UpdateSummary, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_update_into_modifications() {
        let ops: UpdateModifications = Update::Operators(doc! { "$set": { "age": 30 } }).into();
        assert!(matches!(ops, UpdateModifications::Document(_)));

        let pipeline: UpdateModifications =
            Update::Pipeline(vec![doc! { "$set": { "name": "x" } }]).into();
        assert!(matches!(pipeline, UpdateModifications::Pipeline(ref p) if p.len() == 1));
    }

    #[test]
    fn test_summary_accumulates() {
        let mut total = UpdateSummary::default();
        total += UpdateSummary { matched: 2, modified: 1 };
        total += UpdateSummary { matched: 3, modified: 3 };
        assert_eq!(total, UpdateSummary { matched: 5, modified: 4 });
    }
}
