//! Assembles Person and Company records from provider values.

use crate::provider::FakeValueProvider;
use bench_core::{age_on, Company, Person};
use chrono::NaiveDate;

/// Youngest generated age by default.
pub const DEFAULT_MIN_AGE: u32 = 18;
/// Oldest generated age by default.
pub const DEFAULT_MAX_AGE: u32 = 70;

/// Builds records from a [`FakeValueProvider`].
///
/// The generator holds no per-record state; `today` is fixed when it is
/// created so that every age in a run is derived against the same date.
#[derive(Debug, Clone, Copy)]
pub struct RecordGenerator {
    today: NaiveDate,
    min_age: u32,
    max_age: u32,
}

impl RecordGenerator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    /// Set the inclusive age range people are drawn from.
    pub fn with_age_range(mut self, min_age: u32, max_age: u32) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn company(&self, provider: &mut dyn FakeValueProvider) -> Company {
        Company {
            domain: provider.domain(),
            email: provider.company_email(),
            name: provider.company_name(),
            url: provider.url(),
            vat_number: provider.vat(),
        }
    }

    pub fn person(&self, provider: &mut dyn FakeValueProvider) -> Person {
        let date_of_birth = provider.date_of_birth(self.min_age, self.max_age, self.today);
        Person {
            age: age_on(date_of_birth, self.today),
            company_email: provider.company_email(),
            date_of_birth,
            email: provider.email(),
            first_name: provider.first_name(),
            full_name: provider.full_name(),
            sex: provider.sex(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeededFakeProvider;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    #[test]
    fn test_person_age_matches_date_of_birth() {
        let generator = RecordGenerator::new(today());
        let mut provider = SeededFakeProvider::new(42);

        for _ in 0..100 {
            let person = generator.person(&mut provider);
            assert_eq!(person.age, age_on(person.date_of_birth, today()));
            assert!((18..=70).contains(&person.age));
        }
    }

    #[test]
    fn test_custom_age_range() {
        let generator = RecordGenerator::new(today()).with_age_range(40, 45);
        let mut provider = SeededFakeProvider::new(9);

        for _ in 0..100 {
            let person = generator.person(&mut provider);
            assert!((40..=45).contains(&person.age));
        }
    }

    #[test]
    fn test_same_seed_same_records() {
        let generator = RecordGenerator::new(today());
        let mut p1 = SeededFakeProvider::new(42);
        let mut p2 = SeededFakeProvider::new(42);

        assert_eq!(generator.company(&mut p1), generator.company(&mut p2));
        assert_eq!(generator.person(&mut p1), generator.person(&mut p2));
    }

    #[test]
    fn test_company_fields_populated() {
        let generator = RecordGenerator::new(today());
        let mut provider = SeededFakeProvider::new(1);
        let company = generator.company(&mut provider);

        assert!(!company.name.is_empty());
        assert!(company.email.contains('@'));
        assert!(company.url.starts_with("http"));
        assert_eq!(company.vat_number.len(), 10);
    }
}
