//! Companies and people as separate documents linked by `company_id`.

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
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use std::collections::HashSet;

/// Discriminator value of company documents.
pub const COMPANY_TYPE: &str = "company";
/// Discriminator value of person documents.
pub const PERSON_TYPE: &str = "person";

/// Normalized layout: one collection holding both shapes, told apart by
/// `type`.
pub struct ReferencedLayout {
    ctx: BenchContext,
    company_ids: HashSet<ObjectId>,
}

impl ReferencedLayout {
    pub fn new(ctx: BenchContext) -> Self {
        Self {
            ctx,
            company_ids: HashSet::new(),
        }
    }

    fn tagged(kind: &str, body: Document) -> Document {
        let mut doc = doc! { "type": kind };
        doc.extend(body);
        doc
    }
}

#[async_trait]
impl DocumentLayout for ReferencedLayout {
    type CompanyRef = ObjectId;

    fn kind(&self) -> LayoutKind {
        LayoutKind::Referenced
    }

    fn context(&self) -> &BenchContext {
        &self.ctx
    }

    /// Insert every company up front so their ids exist before any person
    /// refers to them.
    async fn store_companies(
        &mut self,
        writer: &mut BatchWriter,
        companies: Vec<Company>,
    ) -> Result<Vec<ObjectId>, BenchError> {
        let docs = companies
            .iter()
            .map(|c| Self::tagged(COMPANY_TYPE, company_document(c)))
            .collect();
        let ids = writer.insert_all(docs).await?;
        if ids.len() != companies.len() {
            return Err(BenchError::InconsistentReference(format!(
                "{} companies inserted but {} ids returned",
                companies.len(),
                ids.len()
            )));
        }

        let mut refs = Vec::with_capacity(ids.len());
        for id in ids {
            let Bson::ObjectId(oid) = id else {
                return Err(BenchError::InconsistentReference(format!(
                    "company id {id} is not an ObjectId"
                )));
            };
            self.company_ids.insert(oid);
            refs.push(oid);
        }
        Ok(refs)
    }

    async fn store_person_batch(
        &mut self,
        writer: &mut BatchWriter,
        company: &mut ObjectId,
        persons: Vec<Person>,
    ) -> Result<(), BenchError> {
        if !self.company_ids.contains(company) {
            return Err(BenchError::InconsistentReference(format!(
                "company {company} was not inserted in this run"
            )));
        }
        for person in &persons {
            let mut doc = Self::tagged(PERSON_TYPE, person_document(person));
            doc.insert("company_id", *company);
            writer.push(doc, 1).await?;
        }
        Ok(())
    }

    async fn employee_companies(&self) -> Result<Vec<EmployeeCompany>, StoreError> {
        let pipeline = vec![
            doc! { "$match": { "type": PERSON_TYPE } },
            doc! { "$lookup": {
                "from": &self.ctx.collection,
                "localField": "company_id",
                "foreignField": "_id",
                "as": "company",
            } },
            doc! { "$unwind": "$company" },
            doc! { "$project": { "_id": 0, "fullName": 1, "companyName": "$company.name" } },
        ];
        let rows = self.ctx.store.aggregate(&self.ctx.collection, pipeline).await?;
        decode_all(rows, EmployeeCompany::from_document)
    }

    async fn company_headcounts(&self) -> Result<Vec<CompanyHeadcount>, StoreError> {
        let pipeline = vec![
            doc! { "$match": { "type": COMPANY_TYPE } },
            doc! { "$lookup": {
                "from": &self.ctx.collection,
                "localField": "_id",
                "foreignField": "company_id",
                "as": "employees",
            } },
            doc! { "$project": { "name": 1, "employeeCount": { "$size": "$employees" } } },
            doc! { "$sort": { "_id": 1 } },
        ];
        let rows = self.ctx.store.aggregate(&self.ctx.collection, pipeline).await?;
        decode_all(rows, |doc| CompanyHeadcount::from_document(doc, "name"))
    }

    async fn normalize_aged_people(&self) -> Result<UpdateSummary, StoreError> {
        let mut filter = doc! { "type": PERSON_TYPE };
        filter.extend(born_before_cutoff(""));
        self.ctx
            .store
            .update_many(
                &self.ctx.collection,
                filter,
                Update::Operators(doc! { "$set": { "age": AGED_AGE } }),
            )
            .await
    }

    async fn suffix_company_names(&self) -> Result<UpdateSummary, StoreError> {
        self.ctx
            .store
            .update_many(
                &self.ctx.collection,
                doc! { "type": COMPANY_TYPE },
                append_suffix("name"),
            )
            .await
    }

    async fn aged_people_preview(&self, limit: i64) -> Result<Vec<AgedPerson>, StoreError> {
        let mut filter = doc! { "type": PERSON_TYPE };
        filter.extend(born_before_cutoff(""));
        let rows = self
            .ctx
            .store
            .find(
                &self.ctx.collection,
                filter,
                FindOptions::default()
                    .projection(doc! { "_id": 0, "fullName": 1, "dateOfBirth": 1, "age": 1 })
                    .limit(limit),
            )
            .await?;
        decode_all(rows, AgedPerson::from_document)
    }

    async fn company_names_preview(&self, limit: i64) -> Result<Vec<String>, StoreError> {
        let rows = self
            .ctx
            .store
            .find(
                &self.ctx.collection,
                doc! { "type": COMPANY_TYPE },
                FindOptions::default()
                    .projection(doc! { "_id": 0, "name": 1 })
                    .sort(doc! { "_id": 1 })
                    .limit(limit),
            )
            .await?;
        decode_all(rows, |doc| Ok(doc.get_str("name")?.to_string()))
    }
}
