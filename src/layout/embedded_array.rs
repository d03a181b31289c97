//! Company documents carrying their list of employees.

use super::{
    append_suffix, born_before_cutoff, cutoff, decode_all, AgedPerson, CompanyHeadcount,
    DocumentLayout, EmployeeCompany,
};
use crate::context::BenchContext;
use crate::error::BenchError;
use crate::writer::BatchWriter;
use async_trait::async_trait;
use bench_core::{Company, LayoutKind, Person, AGED_AGE};
use bench_store::convert::{company_document, get_int, person_document};
use bench_store::{FindOptions, StoreError, Update, UpdateSummary};
use bson::{doc, Bson, DateTime as BsonDateTime, Document};
use tracing::debug;

/// A company whose employees are still being generated.
#[derive(Debug, Clone)]
pub struct PendingCompany {
    company: Document,
    employees: Vec<Bson>,
}

impl PendingCompany {
    fn into_document(self) -> Document {
        let mut doc = self.company;
        doc.insert("employees", self.employees);
        doc
    }
}

/// Nested layout: every document is a company with an `employees` array.
///
/// The writer's unit is a whole company, so batches are counted in
/// companies rather than people.
pub struct EmbeddedArrayLayout {
    ctx: BenchContext,
}

impl EmbeddedArrayLayout {
    pub fn new(ctx: BenchContext) -> Self {
        Self { ctx }
    }
}

/// Set `age` on employees born before `cutoff`; returns whether any entry
/// changed.
fn normalize_employees(employees: &mut [Bson], cutoff: BsonDateTime) -> Result<bool, StoreError> {
    let mut changed = false;
    for employee in employees {
        let Bson::Document(fields) = employee else {
            return Err(StoreError::InvalidDocument(
                "employee entry is not a document".to_string(),
            ));
        };
        if *fields.get_datetime("dateOfBirth")? < cutoff && get_int(fields, "age")? != AGED_AGE {
            fields.insert("age", AGED_AGE);
            changed = true;
        }
    }
    Ok(changed)
}

#[async_trait]
impl DocumentLayout for EmbeddedArrayLayout {
    type CompanyRef = PendingCompany;

    fn kind(&self) -> LayoutKind {
        LayoutKind::EmbeddedArray
    }

    fn context(&self) -> &BenchContext {
        &self.ctx
    }

    /// Companies are held back until their employee lists are complete.
    async fn store_companies(
        &mut self,
        _writer: &mut BatchWriter,
        companies: Vec<Company>,
    ) -> Result<Vec<PendingCompany>, BenchError> {
        Ok(companies
            .iter()
            .map(|c| PendingCompany {
                company: company_document(c),
                employees: Vec::new(),
            })
            .collect())
    }

    async fn store_person_batch(
        &mut self,
        _writer: &mut BatchWriter,
        company: &mut PendingCompany,
        persons: Vec<Person>,
    ) -> Result<(), BenchError> {
        company
            .employees
            .extend(persons.iter().map(|p| Bson::Document(person_document(p))));
        Ok(())
    }

    async fn close_company(
        &mut self,
        writer: &mut BatchWriter,
        company: PendingCompany,
    ) -> Result<(), BenchError> {
        let persons = company.employees.len() as u64;
        writer.push(company.into_document(), persons).await
    }

    async fn employee_companies(&self) -> Result<Vec<EmployeeCompany>, StoreError> {
        let pipeline = vec![
            doc! { "$unwind": "$employees" },
            doc! { "$project": {
                "_id": 0,
                "fullName": "$employees.fullName",
                "companyName": "$name",
            } },
        ];
        let rows = self.ctx.store.aggregate(&self.ctx.collection, pipeline).await?;
        decode_all(rows, EmployeeCompany::from_document)
    }

    async fn company_headcounts(&self) -> Result<Vec<CompanyHeadcount>, StoreError> {
        let pipeline = vec![
            doc! { "$project": { "name": 1, "employeeCount": { "$size": "$employees" } } },
            doc! { "$sort": { "_id": 1 } },
        ];
        let rows = self.ctx.store.aggregate(&self.ctx.collection, pipeline).await?;
        decode_all(rows, |doc| CompanyHeadcount::from_document(doc, "name"))
    }

    /// Read each company with at least one matching employee, rewrite the
    /// matching ages in memory and save the whole list back.
    ///
    /// This is a read-modify-write per company with no isolation: a
    /// concurrent writer to the same company between the read and the save
    /// would be overwritten. `matched` counts companies read and `modified`
    /// counts companies saved.
    async fn normalize_aged_people(&self) -> Result<UpdateSummary, StoreError> {
        let cutoff = cutoff();
        let companies = self
            .ctx
            .store
            .find(
                &self.ctx.collection,
                born_before_cutoff("employees."),
                FindOptions::default().projection(doc! { "employees": 1 }),
            )
            .await?;

        let mut summary = UpdateSummary::default();
        for company in companies {
            summary.matched += 1;
            let id = company
                .get("_id")
                .cloned()
                .ok_or_else(|| StoreError::InvalidDocument("company without _id".to_string()))?;
            let mut employees = company.get_array("employees")?.clone();
            if !normalize_employees(&mut employees, cutoff)? {
                continue;
            }

            let saved = self
                .ctx
                .store
                .update_many(
                    &self.ctx.collection,
                    doc! { "_id": id },
                    Update::Operators(doc! { "$set": { "employees": employees } }),
                )
                .await?;
            summary.modified += saved.modified;
        }
        debug!(
            "Q3 rewrote {} of {} companies",
            summary.modified, summary.matched
        );
        Ok(summary)
    }

    async fn suffix_company_names(&self) -> Result<UpdateSummary, StoreError> {
        self.ctx
            .store
            .update_many(&self.ctx.collection, doc! {}, append_suffix("name"))
            .await
    }

    async fn aged_people_preview(&self, limit: i64) -> Result<Vec<AgedPerson>, StoreError> {
        let pipeline = vec![
            doc! { "$unwind": "$employees" },
            doc! { "$match": born_before_cutoff("employees.") },
            doc! { "$limit": limit },
            doc! { "$project": {
                "_id": 0,
                "fullName": "$employees.fullName",
                "dateOfBirth": "$employees.dateOfBirth",
                "age": "$employees.age",
            } },
        ];
        let rows = self.ctx.store.aggregate(&self.ctx.collection, pipeline).await?;
        decode_all(rows, AgedPerson::from_document)
    }

    async fn company_names_preview(&self, limit: i64) -> Result<Vec<String>, StoreError> {
        let rows = self
            .ctx
            .store
            .find(
                &self.ctx.collection,
                doc! {},
                FindOptions::default()
                    .projection(doc! { "_id": 0, "name": 1 })
                    .sort(doc! { "_id": 1 })
                    .limit(limit),
            )
            .await?;
        decode_all(rows, |doc| Ok(doc.get_str("name")?.to_string()))
    }
}
