//! Person documents carrying a copy of their company.

use super::{
    append_suffix, born_before_cutoff, decode_all, AgedPerson, CompanyHeadcount,
    DocumentLayout, EmployeeCompany,
};
use crate::context::BenchContext;
use crate::error::BenchError;
use crate::writer::BatchWriter;
use async_trait::async_trait;
use bench_core::{Company, LayoutKind, Person, AGED_AGE};
use bench_store::convert::{company_document, person_document};
use bench_store::{FindOptions, StoreError, Update, UpdateSummary};
use bson::{doc, Document};

/// Denormalized layout: every document is a person with a `company`
/// sub-document.
///
/// Company-level queries group by the embedded `company.name`, so two
/// companies generated with the same name are counted as one.
pub struct EmbeddedSingleLayout {
    ctx: BenchContext,
}

impl EmbeddedSingleLayout {
    pub fn new(ctx: BenchContext) -> Self {
        Self { ctx }
    }

    /// Companies by embedded name, ordered by their first person.
    fn companies_by_first_employee(accumulators: Document) -> Vec<Document> {
        let mut group = doc! { "_id": "$company.name" };
        group.extend(accumulators);
        group.insert("firstSeen", doc! { "$min": "$_id" });
        vec![
            doc! { "$group": group },
            doc! { "$sort": { "firstSeen": 1 } },
        ]
    }
}

#[async_trait]
impl DocumentLayout for EmbeddedSingleLayout {
    type CompanyRef = Document;

    fn kind(&self) -> LayoutKind {
        LayoutKind::EmbeddedSingle
    }

    fn context(&self) -> &BenchContext {
        &self.ctx
    }

    /// Nothing is written for companies; each one becomes the sub-document
    /// copied into its employees.
    async fn store_companies(
        &mut self,
        _writer: &mut BatchWriter,
        companies: Vec<Company>,
    ) -> Result<Vec<Document>, BenchError> {
        Ok(companies.iter().map(company_document).collect())
    }

    async fn store_person_batch(
        &mut self,
        writer: &mut BatchWriter,
        company: &mut Document,
        persons: Vec<Person>,
    ) -> Result<(), BenchError> {
        for person in &persons {
            let mut doc = person_document(person);
            doc.insert("company", company.clone());
            writer.push(doc, 1).await?;
        }
        Ok(())
    }

    async fn employee_companies(&self) -> Result<Vec<EmployeeCompany>, StoreError> {
        let rows = self
            .ctx
            .store
            .find(
                &self.ctx.collection,
                doc! {},
                FindOptions::default().projection(doc! { "_id": 0, "fullName": 1, "company.name": 1 }),
            )
            .await?;
        decode_all(rows, |doc| {
            Ok(EmployeeCompany {
                full_name: doc.get_str("fullName")?.to_string(),
                company_name: doc.get_document("company")?.get_str("name")?.to_string(),
            })
        })
    }

    async fn company_headcounts(&self) -> Result<Vec<CompanyHeadcount>, StoreError> {
        let pipeline =
            Self::companies_by_first_employee(doc! { "employeeCount": { "$sum": 1 } });
        let rows = self.ctx.store.aggregate(&self.ctx.collection, pipeline).await?;
        decode_all(rows, |doc| CompanyHeadcount::from_document(doc, "_id"))
    }

    async fn normalize_aged_people(&self) -> Result<UpdateSummary, StoreError> {
        self.ctx
            .store
            .update_many(
                &self.ctx.collection,
                born_before_cutoff(""),
                Update::Operators(doc! { "$set": { "age": AGED_AGE } }),
            )
            .await
    }

    /// Every person's copy of the company name is rewritten on its own.
    async fn suffix_company_names(&self) -> Result<UpdateSummary, StoreError> {
        self.ctx
            .store
            .update_many(&self.ctx.collection, doc! {}, append_suffix("company.name"))
            .await
    }

    async fn aged_people_preview(&self, limit: i64) -> Result<Vec<AgedPerson>, StoreError> {
        let rows = self
            .ctx
            .store
            .find(
                &self.ctx.collection,
                born_before_cutoff(""),
                FindOptions::default()
                    .projection(doc! { "_id": 0, "fullName": 1, "dateOfBirth": 1, "age": 1 })
                    .limit(limit),
            )
            .await?;
        decode_all(rows, AgedPerson::from_document)
    }

    async fn company_names_preview(&self, limit: i64) -> Result<Vec<String>, StoreError> {
        let mut pipeline = Self::companies_by_first_employee(Document::new());
        pipeline.push(doc! { "$limit": limit });
        let rows = self.ctx.store.aggregate(&self.ctx.collection, pipeline).await?;
        decode_all(rows, |doc| Ok(doc.get_str("_id")?.to_string()))
    }
}
