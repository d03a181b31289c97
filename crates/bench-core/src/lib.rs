//! Core types for the document-shape benchmark.
//!
//! This crate holds everything that is independent of the document store:
//!
//! - [`Person`] / [`Company`] - the logical records being generated
//! - [`LayoutKind`] - the three physical layouts a run can target
//! - [`distribute_employees`] - the even split of people across companies
//! - [`age_on`] - age derivation from a date of birth
//!
//! # Architecture
//!
//! ```text
//! bench-core (this crate)
//!    │
//!    ├─── bench-generator  (fills Person/Company from a fake value provider)
//!    │
//!    ├─── bench-store      (maps Person/Company onto BSON documents)
//!    │
//!    └─── docshape-bench   (layouts, batch writer, query bench, CLI)
//! ```

pub mod distribution;
pub mod layout;
pub mod model;

pub use distribution::{distribute_employees, DistributionError};
pub use layout::LayoutKind;
pub use model::{age_on, aged_cutoff, Company, Person, Sex, AGED_AGE, COMPANY_SUFFIX};
