//! Physical document layouts.
//!
//! Each layout decides how companies and people become documents and how the
//! four benchmark queries are expressed against that shape:
//!
//! | Query | Meaning                                              |
//! |-------|------------------------------------------------------|
//! | Q1    | every person's full name with their company's name   |
//! | Q2    | every company's name with its number of employees    |
//! | Q3    | set `age` to 30 for everyone born before 1988-01-01  |
//! | Q4    | append `" Company"` to every company name            |
//!
//! All layout-specific logic lives in the [`DocumentLayout`] implementations;
//! the loader and the query bench only see the trait.

mod embedded_array;
mod embedded_single;
mod referenced;

pub use embedded_array::{EmbeddedArrayLayout, PendingCompany};
pub use embedded_single::EmbeddedSingleLayout;
pub use referenced::ReferencedLayout;

use crate::context::BenchContext;
use crate::error::BenchError;
use crate::writer::BatchWriter;
use async_trait::async_trait;
use bench_core::{aged_cutoff, Company, LayoutKind, Person, COMPANY_SUFFIX};
use bench_store::convert::{bson_to_date, date_to_bson, get_int};
use bench_store::{StoreError, Update, UpdateSummary};
use bson::{doc, DateTime as BsonDateTime, Document};
use chrono::NaiveDate;
use serde::Serialize;

/// Q1 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCompany {
    pub full_name: String,
    pub company_name: String,
}

impl EmployeeCompany {
    /// Decode a `{ fullName, companyName }` row.
    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            full_name: doc.get_str("fullName")?.to_string(),
            company_name: doc.get_str("companyName")?.to_string(),
        })
    }
}

/// Q2 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyHeadcount {
    pub company_name: String,
    pub employees: u64,
}

impl CompanyHeadcount {
    /// Decode a row holding the name under `name_key` and an `employeeCount`.
    fn from_document(doc: &Document, name_key: &str) -> Result<Self, StoreError> {
        let count = get_int(doc, "employeeCount")?;
        Ok(Self {
            company_name: doc.get_str(name_key)?.to_string(),
            employees: u64::try_from(count).map_err(|_| {
                StoreError::InvalidDocument(format!("negative employee count {count}"))
            })?,
        })
    }
}

/// A person born before the Q3 cutoff, read back after the update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgedPerson {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub age: i32,
}

impl AgedPerson {
    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        Ok(Self {
            full_name: doc.get_str("fullName")?.to_string(),
            date_of_birth: bson_to_date(*doc.get_datetime("dateOfBirth")?),
            age: get_int(doc, "age")?,
        })
    }
}

/// One physical arrangement of companies and people.
///
/// Loading goes through three calls driven by the loader:
///
/// 1. [`store_companies`](Self::store_companies) once, with every company in
///    generation order, returning one handle per company
/// 2. [`store_person_batch`](Self::store_person_batch) for each chunk of a
///    company's employees
/// 3. [`close_company`](Self::close_company) once the company has all its
///    employees
#[async_trait]
pub trait DocumentLayout: Send + Sync {
    /// What a person needs to know about its company when it is stored.
    type CompanyRef: Send;

    fn kind(&self) -> LayoutKind;

    fn context(&self) -> &BenchContext;

    async fn store_companies(
        &mut self,
        writer: &mut BatchWriter,
        companies: Vec<Company>,
    ) -> Result<Vec<Self::CompanyRef>, BenchError>;

    async fn store_person_batch(
        &mut self,
        writer: &mut BatchWriter,
        company: &mut Self::CompanyRef,
        persons: Vec<Person>,
    ) -> Result<(), BenchError>;

    async fn close_company(
        &mut self,
        _writer: &mut BatchWriter,
        _company: Self::CompanyRef,
    ) -> Result<(), BenchError> {
        Ok(())
    }

    /// Q1, in company-major order.
    async fn employee_companies(&self) -> Result<Vec<EmployeeCompany>, StoreError>;

    /// Q2, in company generation order.
    async fn company_headcounts(&self) -> Result<Vec<CompanyHeadcount>, StoreError>;

    /// Q3.
    async fn normalize_aged_people(&self) -> Result<UpdateSummary, StoreError>;

    /// Q4.
    async fn suffix_company_names(&self) -> Result<UpdateSummary, StoreError>;

    /// Up to `limit` people born before the Q3 cutoff.
    async fn aged_people_preview(&self, limit: i64) -> Result<Vec<AgedPerson>, StoreError>;

    /// Up to `limit` company names in generation order.
    async fn company_names_preview(&self, limit: i64) -> Result<Vec<String>, StoreError>;
}

/// The Q3 cutoff as stored in `dateOfBirth`.
pub(crate) fn cutoff() -> BsonDateTime {
    date_to_bson(aged_cutoff())
}

/// `{ <prefix>dateOfBirth: { $lt: cutoff } }`
pub(crate) fn born_before_cutoff(prefix: &str) -> Document {
    doc! { format!("{prefix}dateOfBirth"): { "$lt": cutoff() } }
}

/// Pipeline update appending the company suffix to `field`.
pub(crate) fn append_suffix(field: &str) -> Update {
    Update::Pipeline(vec![doc! {
        "$set": { field: { "$concat": [format!("${field}"), COMPANY_SUFFIX] } }
    }])
}

pub(crate) fn decode_all<T>(
    docs: Vec<Document>,
    decode: impl Fn(&Document) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    docs.iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_born_before_cutoff_filter() {
        let filter = born_before_cutoff("employees.");
        let cond = filter.get_document("employees.dateOfBirth").unwrap();
        assert_eq!(
            bson_to_date(*cond.get_datetime("$lt").unwrap()),
            NaiveDate::from_ymd_opt(1988, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_append_suffix_pipeline() {
        let Update::Pipeline(stages) = append_suffix("company.name") else {
            panic!("expected a pipeline update");
        };
        assert_eq!(
            stages,
            vec![doc! { "$set": { "company.name": { "$concat": ["$company.name", " Company"] } } }]
        );
    }

    #[test]
    fn test_headcount_decoding() {
        let row = CompanyHeadcount::from_document(
            &doc! { "_id": "Acme", "employeeCount": 4_i64 },
            "_id",
        )
        .unwrap();
        assert_eq!(row.company_name, "Acme");
        assert_eq!(row.employees, 4);

        assert!(CompanyHeadcount::from_document(&doc! { "name": "Acme" }, "name").is_err());
    }
}
