//! MongoDB-backed document store.

use crate::error::StoreError;
use crate::store::{DocumentStore, FindOptions, Update, UpdateSummary};
use async_trait::async_trait;
use bson::{Bson, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Database};
use tracing::debug;

/// Document store backed by a MongoDB database.
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect to MongoDB and verify the database answers.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = MongoStore::connect("mongodb://localhost:27017/", "local").await?;
    /// ```
    pub async fn connect(connection_string: &str, database_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(connection_string).await?;
        let database = client.database(database_name);

        // Test connection
        database.list_collection_names().await?;

        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.collection(name).drop().await?;
        Ok(())
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.database.create_collection(name).await?;
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<Bson>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let result = self.collection(collection).insert_many(documents).await?;

        // The driver reports ids keyed by input position.
        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter);
        if let Some(projection) = options.projection {
            action = action.projection(projection);
        }
        if let Some(sort) = options.sort {
            action = action.sort(sort);
        }
        if let Some(limit) = options.limit {
            action = action.limit(limit);
        }

        let cursor = action.await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        debug!("find on '{}' returned {} documents", collection, documents.len());
        Ok(documents)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection(collection).aggregate(pipeline).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        debug!(
            "aggregate on '{}' returned {} documents",
            collection,
            documents.len()
        );
        Ok(documents)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Update,
    ) -> Result<UpdateSummary, StoreError> {
        let result = self
            .collection(collection)
            .update_many(filter, update)
            .await?;
        Ok(UpdateSummary {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }
}
