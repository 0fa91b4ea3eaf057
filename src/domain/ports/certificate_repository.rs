use crate::domain::entities::Certificate;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Single-statement insert.
    ///
    /// Fails with `DomainError::DuplicateCertificate` when the (user, sub-course) pair is
    /// already certified and `DomainError::CertificateCodeCollision` when the code is taken.
    async fn create_certificate(&self, certificate: &Certificate) -> DomainResult<()>;
    async fn get_certificate_by_id(&self, id: &str) -> DomainResult<Option<Certificate>>;
    /// Any certificate for the pair, active or not.
    async fn find_certificate_for_pair(
        &self,
        user_id: &str,
        sub_course_id: &str,
    ) -> DomainResult<Option<Certificate>>;
    async fn find_active_certificate_by_code(&self, code: &str)
        -> DomainResult<Option<Certificate>>;
    /// Active certificates, newest `issue_date` first.
    async fn list_active_certificates_for_user(&self, user_id: &str)
        -> DomainResult<Vec<Certificate>>;
    /// Same conflict mapping as `create_certificate`.
    async fn update_certificate(&self, certificate: &Certificate) -> DomainResult<()>;
    /// Returns false when no row matched.
    async fn delete_certificate(&self, id: &str) -> DomainResult<bool>;
}
