use crate::domain::errors::FieldError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Proof of completion of one sub-course by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certificate {
    pub id: String,
    pub certificate_code: String,
    pub user_id: String,
    pub sub_course_id: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Certificate {
    pub fn new(
        certificate_code: String,
        user_id: String,
        sub_course_id: String,
        issue_date: NaiveDate,
        expiry_date: Option<NaiveDate>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let now = issued_at.to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            certificate_code,
            user_id,
            sub_course_id,
            issue_date,
            expiry_date,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date.map(|expiry| expiry < today).unwrap_or(false)
    }
}

/// Expiry, when present, must fall strictly after the issue date.
pub fn validate_dates(issue_date: NaiveDate, expiry_date: Option<NaiveDate>) -> Vec<FieldError> {
    match expiry_date {
        Some(expiry) if expiry <= issue_date => vec![FieldError::new(
            "expiry_date",
            "The expiry date must be a date after the issue date",
        )],
        _ => Vec::new(),
    }
}

// ========== DTOs ==========

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCertificateRequest {
    pub user_id: String,
    pub sub_course_id: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

impl IssueCertificateRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.user_id.trim().is_empty() {
            errors.push(FieldError::new("user_id", "The user field is required"));
        }
        if self.sub_course_id.trim().is_empty() {
            errors.push(FieldError::new(
                "sub_course_id",
                "The sub course field is required",
            ));
        }
        errors.extend(validate_dates(self.issue_date, self.expiry_date));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update. `expiry_date: null` clears the expiry; omitting it leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCertificateRequest {
    pub user_id: Option<String>,
    pub sub_course_id: Option<String>,
    pub issue_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub expiry_date: Option<Option<NaiveDate>>,
    pub active: Option<bool>,
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    pub id: String,
    pub certificate_code: String,
    pub user_id: String,
    pub sub_course_id: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Certificate> for CertificateResponse {
    fn from(c: Certificate) -> Self {
        Self {
            id: c.id,
            certificate_code: c.certificate_code,
            user_id: c.user_id,
            sub_course_id: c.sub_course_id,
            issue_date: c.issue_date,
            expiry_date: c.expiry_date,
            active: c.active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Public verification view: nothing beyond the code identifies stored rows.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CertificateVerification {
    pub certificate_code: String,
    pub holder_name: String,
    pub course_title: Option<String>,
    pub sub_course_title: String,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub expired: bool,
}
