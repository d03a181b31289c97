//! Batched document writes.

use crate::context::BenchContext;
use crate::error::BenchError;
use bson::{Bson, Document};
use tracing::debug;

/// Counters kept by a [`BatchWriter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Documents accepted by the store.
    pub documents: u64,
    /// Batches flushed.
    pub batches: u64,
    /// Persons carried by the documents accepted so far.
    pub persons: u64,
}

/// Buffers documents and inserts them in batches of a fixed size.
///
/// At most `batch_size` documents are held at any time. Documents reach the
/// store in the order they were pushed.
pub struct BatchWriter {
    ctx: BenchContext,
    batch_size: usize,
    buffer: Vec<Document>,
    buffered_persons: u64,
    stats: WriteStats,
}

impl BatchWriter {
    pub fn new(ctx: BenchContext, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            ctx,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            buffered_persons: 0,
            stats: WriteStats::default(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Documents waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Queue a document holding `persons` people, flushing when the buffer
    /// reaches the batch size.
    pub async fn push(&mut self, document: Document, persons: u64) -> Result<(), BenchError> {
        self.buffer.push(document);
        self.buffered_persons += persons;
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Insert whatever is buffered. An empty buffer is a no-op.
    pub async fn flush(&mut self) -> Result<Vec<Bson>, BenchError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        let batch = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size));
        let persons = std::mem::take(&mut self.buffered_persons);
        self.insert(batch, persons).await
    }

    /// Insert `documents` right away in batch-size chunks and return their ids
    /// in order. Anything already buffered is flushed first. The documents
    /// carry no persons.
    pub async fn insert_all(&mut self, documents: Vec<Document>) -> Result<Vec<Bson>, BenchError> {
        self.flush().await?;

        let mut ids = Vec::with_capacity(documents.len());
        let mut documents = documents.into_iter().peekable();
        while documents.peek().is_some() {
            let batch: Vec<Document> = documents.by_ref().take(self.batch_size).collect();
            ids.extend(self.insert(batch, 0).await?);
        }
        Ok(ids)
    }

    /// Flush the remainder and return the final counters.
    pub async fn finish(mut self) -> Result<WriteStats, BenchError> {
        self.flush().await?;
        Ok(self.stats)
    }

    async fn insert(&mut self, batch: Vec<Document>, persons: u64) -> Result<Vec<Bson>, BenchError> {
        let number = self.stats.batches + 1;
        let len = batch.len() as u64;

        let ids = self
            .ctx
            .store
            .insert_many(&self.ctx.collection, batch)
            .await
            .map_err(|source| BenchError::WriteRejected {
                batch: number,
                source,
            })?;

        self.stats.batches = number;
        self.stats.documents += len;
        self.stats.persons += persons;
        debug!(
            "Batch {} inserted: {} documents ({} total)",
            number, len, self.stats.documents
        );
        Ok(ids)
    }
}
