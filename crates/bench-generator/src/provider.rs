//! Fake value providers.

use crate::locales::{ascii_slug, Locale, LOCALES};
use bench_core::Sex;
use chrono::{Days, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Fresh draws tried before a repeated company name gets a serial.
const COMPANY_NAME_DRAWS: usize = 8;

/// Source of randomized field values.
///
/// Every call is independent: there is no correlation guarantee between, say,
/// the first name and the full name of the same person.
pub trait FakeValueProvider: Send {
    fn first_name(&mut self) -> String;
    fn full_name(&mut self) -> String;
    fn email(&mut self) -> String;
    fn company_email(&mut self) -> String;
    /// Never repeats a name already returned by this provider. Layouts that
    /// group people by embedded company name rely on it.
    fn company_name(&mut self) -> String;
    fn domain(&mut self) -> String;
    fn url(&mut self) -> String;
    /// Two uppercase letters followed by eight digits.
    fn vat(&mut self) -> String;
    /// A birth date giving an age in `min_age..=max_age` on `today`.
    fn date_of_birth(&mut self, min_age: u32, max_age: u32, today: NaiveDate) -> NaiveDate;
    fn sex(&mut self) -> Sex;
}

/// Provider drawing from the Italian, Spanish and US-English pools.
///
/// The locale is picked per call, so a single run mixes all three.
pub struct SeededFakeProvider {
    rng: StdRng,
    company_names: HashSet<String>,
}

impl SeededFakeProvider {
    /// Create a provider with a fixed seed (same seed = same values).
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            company_names: HashSet::new(),
        }
    }

    fn locale(&mut self) -> &'static Locale {
        LOCALES[self.rng.gen_range(0..LOCALES.len())]
    }

    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn draw_company_name(&mut self) -> String {
        let locale = self.locale();
        let last = self.pick(locale.last_names);
        if self.rng.gen_bool(0.25) {
            let second = self.pick(locale.last_names);
            return format!("{last} {} {second}", locale.conjunction);
        }
        let suffix = self.pick(locale.company_suffixes);
        format!("{last} {suffix}")
    }

    fn digits(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| char::from(b'0' + self.rng.gen_range(0..10u8)))
            .collect()
    }
}

impl FakeValueProvider for SeededFakeProvider {
    fn first_name(&mut self) -> String {
        let locale = self.locale();
        self.pick(locale.first_names).to_string()
    }

    fn full_name(&mut self) -> String {
        let locale = self.locale();
        let first = self.pick(locale.first_names);
        let last = self.pick(locale.last_names);
        format!("{first} {last}")
    }

    fn email(&mut self) -> String {
        let locale = self.locale();
        let first = ascii_slug(self.pick(locale.first_names));
        let last = ascii_slug(self.pick(locale.last_names));
        let host = self.pick(locale.free_email_domains);
        match self.rng.gen_range(0..3) {
            0 => format!("{first}.{last}@{host}"),
            1 => format!("{first}{}@{host}", self.rng.gen_range(1..100)),
            _ => format!("{}{last}@{host}", &first[..1.min(first.len())]),
        }
    }

    fn company_email(&mut self) -> String {
        let locale = self.locale();
        let user = ascii_slug(self.pick(locale.first_names));
        let domain = self.domain();
        format!("{user}@{domain}")
    }

    fn company_name(&mut self) -> String {
        for _ in 0..COMPANY_NAME_DRAWS {
            let name = self.draw_company_name();
            if self.company_names.insert(name.clone()) {
                return name;
            }
        }

        let base = self.draw_company_name();
        let mut serial = 2u64;
        loop {
            let name = format!("{base} {serial}");
            if self.company_names.insert(name.clone()) {
                return name;
            }
            serial += 1;
        }
    }

    fn domain(&mut self) -> String {
        let locale = self.locale();
        let word = ascii_slug(self.pick(locale.last_names));
        let tld = self.pick(locale.tlds);
        format!("{word}.{tld}")
    }

    fn url(&mut self) -> String {
        let scheme = if self.rng.gen_bool(0.5) { "https" } else { "http" };
        let domain = self.domain();
        if self.rng.gen_bool(0.5) {
            format!("{scheme}://www.{domain}/")
        } else {
            format!("{scheme}://{domain}/")
        }
    }

    fn vat(&mut self) -> String {
        let letters: String = (0..2)
            .map(|_| char::from(b'A' + self.rng.gen_range(0..26u8)))
            .collect();
        format!("{letters}{}", self.digits(8))
    }

    fn date_of_birth(&mut self, min_age: u32, max_age: u32, today: NaiveDate) -> NaiveDate {
        let (min_age, max_age) = (min_age.min(max_age), min_age.max(max_age));

        // Latest birth date still old enough, earliest one not yet too old.
        let latest = today
            .checked_sub_months(Months::new(min_age.saturating_mul(12)))
            .unwrap_or(today);
        let earliest = today
            .checked_sub_months(Months::new(max_age.saturating_add(1).saturating_mul(12)))
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .unwrap_or(latest);

        let span = (latest - earliest).num_days().max(0) as u64;
        let offset = self.rng.gen_range(0..=span);
        earliest
            .checked_add_days(Days::new(offset))
            .unwrap_or(latest)
    }

    fn sex(&mut self) -> Sex {
        Sex::ALL[self.rng.gen_range(0..Sex::ALL.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::age_on;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    #[test]
    fn test_deterministic_generation() {
        let mut p1 = SeededFakeProvider::new(42);
        let mut p2 = SeededFakeProvider::new(42);

        for _ in 0..20 {
            assert_eq!(p1.full_name(), p2.full_name());
            assert_eq!(p1.company_name(), p2.company_name());
            assert_eq!(p1.vat(), p2.vat());
        }
    }

    #[test]
    fn test_company_names_are_unique() {
        let mut provider = SeededFakeProvider::new(42);
        let names: Vec<String> = (0..5_000).map(|_| provider.company_name()).collect();
        let distinct: HashSet<&String> = names.iter().collect();
        assert_eq!(distinct.len(), names.len());
        assert!(names.iter().all(|n| !n.is_empty()));
    }

    #[test]
    fn test_vat_pattern() {
        let mut provider = SeededFakeProvider::new(7);
        for _ in 0..100 {
            let vat = provider.vat();
            assert_eq!(vat.len(), 10);
            assert!(vat[..2].chars().all(|c| c.is_ascii_uppercase()));
            assert!(vat[2..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_date_of_birth_respects_age_range() {
        let mut provider = SeededFakeProvider::new(1);
        for _ in 0..1_000 {
            let dob = provider.date_of_birth(18, 70, today());
            let age = age_on(dob, today());
            assert!((18..=70).contains(&age), "age {age} out of range for {dob}");
        }
    }

    #[test]
    fn test_date_of_birth_single_age() {
        let mut provider = SeededFakeProvider::new(3);
        for _ in 0..200 {
            let dob = provider.date_of_birth(30, 30, today());
            assert_eq!(age_on(dob, today()), 30);
        }
    }

    #[test]
    fn test_date_of_birth_with_extreme_ages() {
        let mut provider = SeededFakeProvider::new(9);
        // Falls back to the latest representable date instead of overflowing.
        let dob = provider.date_of_birth(u32::MAX, u32::MAX, today());
        assert!(dob <= today());
    }

    #[test]
    fn test_emails_and_urls_are_ascii() {
        let mut provider = SeededFakeProvider::new(11);
        for _ in 0..100 {
            let email = provider.email();
            let company_email = provider.company_email();
            let url = provider.url();
            assert!(email.is_ascii() && email.contains('@'), "{email}");
            assert!(company_email.is_ascii() && company_email.contains('@'));
            assert!(url.starts_with("http") && url.ends_with('/'), "{url}");
        }
    }

    #[test]
    fn test_sex_uses_both_markers() {
        let mut provider = SeededFakeProvider::new(5);
        let draws: Vec<Sex> = (0..200).map(|_| provider.sex()).collect();
        assert!(draws.contains(&Sex::Male));
        assert!(draws.contains(&Sex::Female));
    }
}
