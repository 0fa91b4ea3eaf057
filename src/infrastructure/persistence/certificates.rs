use crate::domain::entities::Certificate;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::certificate_repository::CertificateRepository;
use crate::infrastructure::persistence::{nullable_text, Database};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::any::AnyRow;
use sqlx::Row;

const CERTIFICATE_COLUMNS: &str = "id, certificate_code, user_id, sub_course_id, issue_date, \
     expiry_date, active, created_at, updated_at";

/// Map a unique violation on `certificates` to the constraint that fired.
///
/// SQLite names the columns ("UNIQUE constraint failed: certificates.certificate_code"),
/// Postgres and MySQL name the constraint.
fn classify_write_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        let message = db_err.message();
        if message.contains("uq_certificates_code") || message.contains("certificate_code") {
            return DomainError::CertificateCodeCollision;
        }
        if message.contains("uq_certificates_user_sub_course") || message.contains("sub_course_id")
        {
            return DomainError::DuplicateCertificate;
        }
    }
    DomainError::from(err)
}

fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DomainError::Internal(format!("Invalid stored date '{}': {}", value, e)))
}

fn certificate_from_row(row: &AnyRow) -> DomainResult<Certificate> {
    let issue_date: String = row.try_get("issue_date")?;
    let expiry_date = nullable_text(row, "expiry_date");

    Ok(Certificate {
        id: row.try_get("id")?,
        certificate_code: row.try_get("certificate_code")?,
        user_id: row.try_get("user_id")?,
        sub_course_id: row.try_get("sub_course_id")?,
        issue_date: parse_date(&issue_date)?,
        expiry_date: expiry_date.as_deref().map(parse_date).transpose()?,
        active: row.try_get::<i64, _>("active")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl CertificateRepository for Database {
    async fn create_certificate(&self, certificate: &Certificate) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO certificates (id, certificate_code, user_id, sub_course_id, issue_date, expiry_date, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&certificate.id)
        .bind(&certificate.certificate_code)
        .bind(&certificate.user_id)
        .bind(&certificate.sub_course_id)
        .bind(format_date(certificate.issue_date))
        .bind(certificate.expiry_date.map(format_date))
        .bind(if certificate.active { 1i64 } else { 0i64 })
        .bind(&certificate.created_at)
        .bind(&certificate.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;

        Ok(())
    }

    async fn get_certificate_by_id(&self, id: &str) -> DomainResult<Option<Certificate>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM certificates WHERE id = ?",
            CERTIFICATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(certificate_from_row).transpose()
    }

    async fn find_certificate_for_pair(
        &self,
        user_id: &str,
        sub_course_id: &str,
    ) -> DomainResult<Option<Certificate>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM certificates WHERE user_id = ? AND sub_course_id = ?",
            CERTIFICATE_COLUMNS
        ))
        .bind(user_id)
        .bind(sub_course_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(certificate_from_row).transpose()
    }

    async fn find_active_certificate_by_code(
        &self,
        code: &str,
    ) -> DomainResult<Option<Certificate>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM certificates WHERE certificate_code = ? AND active = 1",
            CERTIFICATE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(certificate_from_row).transpose()
    }

    async fn list_active_certificates_for_user(
        &self,
        user_id: &str,
    ) -> DomainResult<Vec<Certificate>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM certificates
             WHERE user_id = ? AND active = 1
             ORDER BY issue_date DESC, created_at DESC",
            CERTIFICATE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(certificate_from_row).collect()
    }

    async fn update_certificate(&self, certificate: &Certificate) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE certificates
             SET user_id = ?, sub_course_id = ?, issue_date = ?, expiry_date = ?, active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&certificate.user_id)
        .bind(&certificate.sub_course_id)
        .bind(format_date(certificate.issue_date))
        .bind(certificate.expiry_date.map(format_date))
        .bind(if certificate.active { 1i64 } else { 0i64 })
        .bind(&certificate.updated_at)
        .bind(&certificate.id)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!(
                "Certificate {} not found",
                certificate.id
            )));
        }

        Ok(())
    }

    async fn delete_certificate(&self, id: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
