//! Person/Company ↔ BSON document conversion.

use crate::error::StoreError;
use bench_core::{Company, Person, Sex};
use bson::{doc, Bson, DateTime as BsonDateTime, Document};
use chrono::{NaiveDate, NaiveTime};

/// Store a calendar date as a BSON datetime at midnight UTC.
pub fn date_to_bson(date: NaiveDate) -> BsonDateTime {
    BsonDateTime::from_chrono(date.and_time(NaiveTime::MIN).and_utc())
}

/// Calendar date (UTC) of a BSON datetime.
pub fn bson_to_date(value: BsonDateTime) -> NaiveDate {
    value.to_chrono().date_naive()
}

/// Company fields without any layout-specific keys.
pub fn company_document(company: &Company) -> Document {
    doc! {
        "domain": &company.domain,
        "email": &company.email,
        "name": &company.name,
        "url": &company.url,
        "vatNumber": &company.vat_number,
    }
}

/// Person fields without any layout-specific keys.
pub fn person_document(person: &Person) -> Document {
    doc! {
        "age": person.age,
        "companyEmail": &person.company_email,
        "dateOfBirth": date_to_bson(person.date_of_birth),
        "email": &person.email,
        "firstName": &person.first_name,
        "fullName": &person.full_name,
        "sex": person.sex.marker(),
    }
}

pub fn company_from_document(doc: &Document) -> Result<Company, StoreError> {
    Ok(Company {
        domain: doc.get_str("domain")?.to_string(),
        email: doc.get_str("email")?.to_string(),
        name: doc.get_str("name")?.to_string(),
        url: doc.get_str("url")?.to_string(),
        vat_number: doc.get_str("vatNumber")?.to_string(),
    })
}

pub fn person_from_document(doc: &Document) -> Result<Person, StoreError> {
    let sex = doc.get_str("sex")?;
    Ok(Person {
        age: get_int(doc, "age")?,
        company_email: doc.get_str("companyEmail")?.to_string(),
        date_of_birth: bson_to_date(*doc.get_datetime("dateOfBirth")?),
        email: doc.get_str("email")?.to_string(),
        first_name: doc.get_str("firstName")?.to_string(),
        full_name: doc.get_str("fullName")?.to_string(),
        sex: Sex::from_marker(sex)
            .ok_or_else(|| StoreError::InvalidDocument(format!("unknown sex marker '{sex}'")))?,
    })
}

/// Read an integer field stored as either `Int32` or `Int64`.
pub fn get_int(doc: &Document, key: &str) -> Result<i32, StoreError> {
    match doc.get(key) {
        Some(Bson::Int32(v)) => Ok(*v),
        Some(Bson::Int64(v)) => i32::try_from(*v)
            .map_err(|_| StoreError::InvalidDocument(format!("{key} out of range: {v}"))),
        Some(other) => Err(StoreError::InvalidDocument(format!(
            "{key} is not an integer: {other}"
        ))),
        None => Err(StoreError::InvalidDocument(format!("missing field {key}"))),
    }
}
