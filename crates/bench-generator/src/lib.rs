//! Person and Company generation for the document-shape benchmark.
//!
//! Generation is split in two:
//!
//! - a [`FakeValueProvider`] supplies individual randomized values (names,
//!   emails, domains, VAT numbers, dates of birth, sex markers)
//! - the [`RecordGenerator`] assembles those values into [`bench_core::Person`]
//!   and [`bench_core::Company`] records and derives the age
//!
//! [`SeededFakeProvider`] draws from Italian, Spanish and US-English pools
//! using a seeded RNG, so the same seed always yields the same data.
//!
//! # Example
//!
//! ```rust
//! use bench_generator::{RecordGenerator, SeededFakeProvider};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let generator = RecordGenerator::new(today);
//! let mut provider = SeededFakeProvider::new(42);
//!
//! let company = generator.company(&mut provider);
//! let person = generator.person(&mut provider);
//! assert!((18..=70).contains(&person.age));
//! assert_eq!(company.vat_number.len(), 10);
//! ```

pub mod locales;
pub mod provider;
pub mod record;

pub use provider::{FakeValueProvider, SeededFakeProvider};
pub use record::RecordGenerator;
