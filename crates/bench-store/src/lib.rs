//! Document store access for the document-shape benchmark.
//!
//! The [`DocumentStore`] trait is the only boundary the benchmark talks to:
//! create/drop a collection, insert a batch, find, aggregate and update.
//! Two implementations are provided:
//!
//! - [`MongoStore`] - a MongoDB database reached through the official driver
//! - [`MemoryStore`] - an in-process store that evaluates the filter,
//!   projection, pipeline and update operators the layouts emit
//!
//! [`convert`] maps [`bench_core::Person`] and [`bench_core::Company`] onto
//! BSON documents and back.

pub mod convert;
pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::{DocumentStore, FindOptions, Update, UpdateSummary};
