use crate::domain::entities::{
    validate_dates, Certificate, CertificateVerification, IssueCertificateRequest, SubCourse,
    UpdateCertificateRequest, User,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::certificate_repository::CertificateRepository;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::course_repository::CourseRepository;
use crate::domain::ports::user_repository::UserRepository;
use crate::domain::services::certificate_code::CertificateCodeGenerator;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

pub const DEFAULT_CODE_MAX_ATTEMPTS: u32 = 3;

/// Certificate lifecycle: issuance, administrative correction, revocation and public lookup.
///
/// The (user, sub-course) invariant is checked up front for a clean error and enforced again
/// by the store's unique constraint, which is what actually wins under concurrent issuance.
#[derive(Clone)]
pub struct CertificateService {
    certificate_repo: Arc<dyn CertificateRepository>,
    user_repo: Arc<dyn UserRepository>,
    course_repo: Arc<dyn CourseRepository>,
    generator: CertificateCodeGenerator,
    clock: Arc<dyn Clock>,
    max_code_attempts: u32,
}

impl CertificateService {
    pub fn new(
        certificate_repo: Arc<dyn CertificateRepository>,
        user_repo: Arc<dyn UserRepository>,
        course_repo: Arc<dyn CourseRepository>,
        generator: CertificateCodeGenerator,
        clock: Arc<dyn Clock>,
        max_code_attempts: u32,
    ) -> Self {
        Self {
            certificate_repo,
            user_repo,
            course_repo,
            generator,
            clock,
            max_code_attempts: max_code_attempts.max(1),
        }
    }

    pub async fn issue(&self, request: IssueCertificateRequest) -> ApiResult<Certificate> {
        request.validate().map_err(DomainError::InvalidFields)?;

        let user = self.require_user(&request.user_id).await?;
        let sub_course = self.require_sub_course(&request.sub_course_id).await?;

        if self
            .certificate_repo
            .find_certificate_for_pair(&user.id, &sub_course.id)
            .await?
            .is_some()
        {
            return Err(DomainError::DuplicateCertificate.into());
        }

        let course_title = self
            .course_repo
            .get_course_by_id(&sub_course.course_id)
            .await?
            .map(|course| course.title);

        for attempt in 1..=self.max_code_attempts {
            let code = self.generator.generate(&user.name, course_title.as_deref());
            let certificate = Certificate::new(
                code,
                user.id.clone(),
                sub_course.id.clone(),
                request.issue_date,
                request.expiry_date,
                self.clock.now(),
            );

            match self.certificate_repo.create_certificate(&certificate).await {
                Ok(()) => {
                    metrics::counter!("certificates_issued_total").increment(1);
                    tracing::info!(
                        "Issued certificate {} to user {} for sub-course {}",
                        certificate.certificate_code,
                        user.id,
                        sub_course.id
                    );
                    return Ok(certificate);
                }
                Err(DomainError::CertificateCodeCollision) => {
                    metrics::counter!("certificate_code_collisions_total").increment(1);
                    tracing::warn!(
                        "Certificate code {} already taken (attempt {}/{})",
                        certificate.certificate_code,
                        attempt,
                        self.max_code_attempts
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ApiError::Conflict(
            "Could not allocate a unique certificate code, please retry".to_string(),
        ))
    }

    pub async fn get(&self, id: &str) -> ApiResult<Certificate> {
        self.certificate_repo
            .get_certificate_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Certificate {} not found", id)))
    }

    /// Administrative correction. The code is never regenerated.
    pub async fn update(
        &self,
        id: &str,
        request: UpdateCertificateRequest,
    ) -> ApiResult<Certificate> {
        let mut certificate = self.get(id).await?;

        if let Some(user_id) = request.user_id {
            certificate.user_id = self.require_user(&user_id).await?.id;
        }
        if let Some(sub_course_id) = request.sub_course_id {
            certificate.sub_course_id = self.require_sub_course(&sub_course_id).await?.id;
        }
        if let Some(issue_date) = request.issue_date {
            certificate.issue_date = issue_date;
        }
        if let Some(expiry_date) = request.expiry_date {
            certificate.expiry_date = expiry_date;
        }
        if let Some(active) = request.active {
            certificate.active = active;
        }

        let errors = validate_dates(certificate.issue_date, certificate.expiry_date);
        if !errors.is_empty() {
            return Err(DomainError::InvalidFields(errors).into());
        }

        if let Some(existing) = self
            .certificate_repo
            .find_certificate_for_pair(&certificate.user_id, &certificate.sub_course_id)
            .await?
        {
            if existing.id != certificate.id {
                return Err(DomainError::DuplicateCertificate.into());
            }
        }

        certificate.updated_at = self.clock.now().to_rfc3339();
        self.certificate_repo.update_certificate(&certificate).await?;

        Ok(certificate)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        if !self.certificate_repo.delete_certificate(id).await? {
            return Err(ApiError::NotFound(format!("Certificate {} not found", id)));
        }
        tracing::info!("Deleted certificate {}", id);
        Ok(())
    }

    /// Public lookup by exact code. Unknown, malformed, deleted and deactivated codes are
    /// indistinguishable.
    pub async fn verify(&self, code: &str) -> ApiResult<CertificateVerification> {
        let result = self.lookup_verification(code).await;

        let outcome = match &result {
            Ok(_) => "found",
            Err(ApiError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        metrics::counter!("certificate_verifications_total", "outcome" => outcome).increment(1);

        result
    }

    async fn lookup_verification(&self, code: &str) -> ApiResult<CertificateVerification> {
        let not_found = || ApiError::NotFound("Certificate not found or invalid".to_string());

        if !self.generator.is_well_formed(code) {
            return Err(not_found());
        }

        let certificate = self
            .certificate_repo
            .find_active_certificate_by_code(code)
            .await?
            .ok_or_else(not_found)?;

        let holder = self
            .user_repo
            .get_user_by_id(&certificate.user_id)
            .await?
            .ok_or_else(not_found)?;
        let sub_course = self
            .course_repo
            .get_sub_course_by_id(&certificate.sub_course_id)
            .await?
            .ok_or_else(not_found)?;
        let course_title = self
            .course_repo
            .get_course_by_id(&sub_course.course_id)
            .await?
            .map(|course| course.title);

        let expired = certificate.is_expired_on(self.clock.today());

        Ok(CertificateVerification {
            certificate_code: certificate.certificate_code,
            holder_name: holder.name,
            course_title,
            sub_course_title: sub_course.title,
            issue_date: certificate.issue_date,
            expiry_date: certificate.expiry_date,
            expired,
        })
    }

    pub async fn list_by_user(&self, user_id: &str) -> ApiResult<Vec<Certificate>> {
        self.require_user(user_id).await?;
        Ok(self
            .certificate_repo
            .list_active_certificates_for_user(user_id)
            .await?)
    }

    async fn require_user(&self, id: &str) -> ApiResult<User> {
        self.user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
    }

    async fn require_sub_course(&self, id: &str) -> ApiResult<SubCourse> {
        self.course_repo
            .get_sub_course_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Sub-course {} not found", id)))
    }
}
