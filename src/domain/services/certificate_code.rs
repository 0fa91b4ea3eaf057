use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::clock::Clock;
use chrono::Datelike;
use rand::Rng;
use regex::Regex;
use std::sync::Arc;

pub const DEFAULT_CODE_PREFIX: &str = "AW";

/// Builds human-decodable certificate codes:
/// `PREFIX` + 4 random digits + holder initial + up to 3 course letters + `MMYY`.
///
/// e.g. `AW0421JAUT0324` for "John Doe" in "Automotive Engine Technology", March 2024.
/// Codes are not unique by construction; the certificate service retries on collision.
#[derive(Clone)]
pub struct CertificateCodeGenerator {
    prefix: String,
    clock: Arc<dyn Clock>,
    pattern: Regex,
}

impl CertificateCodeGenerator {
    pub fn new(prefix: &str, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        if prefix.len() != 2 || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(DomainError::ValidationError(format!(
                "Certificate code prefix must be two uppercase letters, got '{}'",
                prefix
            )));
        }

        let pattern = Regex::new(&format!(r"^{}\d{{4}}[A-Z][A-Z]{{0,3}}\d{{4}}$", prefix))
            .map_err(|e| DomainError::Internal(format!("Invalid code pattern: {}", e)))?;

        Ok(Self {
            prefix: prefix.to_string(),
            clock,
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generate(&self, holder_name: &str, course_title: Option<&str>) -> String {
        self.generate_with_rng(&mut rand::thread_rng(), holder_name, course_title)
    }

    pub fn generate_with_rng<R: Rng>(
        &self,
        rng: &mut R,
        holder_name: &str,
        course_title: Option<&str>,
    ) -> String {
        let serial: u16 = rng.gen_range(0..10_000);
        let mut initial = leading_letters(holder_name, 1);
        if initial.is_empty() {
            initial.push('X');
        }
        let course = course_title
            .map(|title| leading_letters(title, 3))
            .unwrap_or_default();
        let today = self.clock.today();

        format!(
            "{}{:04}{}{}{:02}{:02}",
            self.prefix,
            serial,
            initial,
            course,
            today.month(),
            today.year() % 100
        )
    }

    /// Structural check used to reject malformed codes before touching the store.
    pub fn is_well_formed(&self, code: &str) -> bool {
        self.pattern.is_match(code)
    }
}

/// First `n` ASCII letters, uppercased. Digits, punctuation and non-ASCII characters are
/// skipped so the letter segments never run into the serial or the stamp.
fn leading_letters(value: &str, n: usize) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(n)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
