mod helpers;

use async_trait::async_trait;
use coursehub::application::services::CertificateService;
use coursehub::domain::entities::{
    Certificate, IssueCertificateRequest, Role, UpdateCertificateRequest,
};
use coursehub::domain::errors::{DomainError, DomainResult};
use coursehub::domain::ports::certificate_repository::CertificateRepository;
use coursehub::domain::ports::clock::Clock;
use coursehub::domain::services::certificate_code::CertificateCodeGenerator;
use coursehub::infrastructure::http::middleware::ApiError;
use coursehub::infrastructure::persistence::Database;
use helpers::*;
use regex::Regex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const DUPLICATE_MESSAGE: &str = "A certificate already exists for this user and course";

fn issue_request(user_id: &str, sub_course_id: &str) -> IssueCertificateRequest {
    IssueCertificateRequest {
        user_id: user_id.to_string(),
        sub_course_id: sub_course_id.to_string(),
        issue_date: date(2024, 3, 15),
        expiry_date: None,
    }
}

#[tokio::test]
async fn test_issue_builds_code_from_holder_course_and_month() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, sub_course) =
        create_course_with_sub_course(db, "Automotive Engine Technology", "Engine Basics").await;

    let certificate = state
        .certificate_service
        .issue(issue_request(&user.id, &sub_course.id))
        .await
        .unwrap();

    let pattern = Regex::new(r"^AW\d{4}JAUT0324$").unwrap();
    assert!(
        pattern.is_match(&certificate.certificate_code),
        "unexpected code {}",
        certificate.certificate_code
    );
    assert!(certificate.active);
    assert_eq!(certificate.issue_date, date(2024, 3, 15));

    let stored = state.certificate_service.get(&certificate.id).await.unwrap();
    assert_eq!(stored.certificate_code, certificate.certificate_code);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_issue_and_update_timestamps_follow_clock() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let clock = fixed_clock(2024, 3, 15);
    let state = build_test_state(db, clock.clone());

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let certificate = state
        .certificate_service
        .issue(issue_request(&user.id, &sub_course.id))
        .await
        .unwrap();
    let stamp = clock.now().to_rfc3339();
    assert_eq!(certificate.created_at, stamp);
    assert_eq!(certificate.updated_at, stamp);

    let later = build_test_state(db, fixed_clock(2024, 4, 1));
    let updated = later
        .certificate_service
        .update(
            &certificate.id,
            UpdateCertificateRequest {
                issue_date: Some(date(2024, 3, 10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.created_at, stamp);
    assert_eq!(
        updated.updated_at,
        fixed_clock(2024, 4, 1).now().to_rfc3339()
    );

    let stored = state.certificate_service.get(&certificate.id).await.unwrap();
    assert_eq!(stored.created_at, stamp);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_second_issue_for_same_pair_is_rejected() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "Jane Roe", "jane@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let first = state
        .certificate_service
        .issue(issue_request(&user.id, &sub_course.id))
        .await
        .unwrap();

    let second = state
        .certificate_service
        .issue(issue_request(&user.id, &sub_course.id))
        .await;
    match second {
        Err(ApiError::Conflict(msg)) => assert_eq!(msg, DUPLICATE_MESSAGE),
        other => panic!("Expected duplicate conflict, got {:?}", other),
    }

    // The original is untouched
    let certificates = state.certificate_service.list_by_user(&user.id).await.unwrap();
    assert_eq!(certificates.len(), 1);
    assert_eq!(certificates[0].certificate_code, first.certificate_code);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_duplicate_check_includes_deactivated_certificates() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "Jane Roe", "jane@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let first = state
        .certificate_service
        .issue(issue_request(&user.id, &sub_course.id))
        .await
        .unwrap();
    state
        .certificate_service
        .update(
            &first.id,
            UpdateCertificateRequest {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = state
        .certificate_service
        .issue(issue_request(&user.id, &sub_course.id))
        .await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_concurrent_issuance_creates_exactly_one_certificate() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "Race Condition", "race@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Concurrency", "Locks").await;

    let service = state.certificate_service.clone();
    let (a, b) = tokio::join!(
        service.issue(issue_request(&user.id, &sub_course.id)),
        service.issue(issue_request(&user.id, &sub_course.id)),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one issuance should win");

    let loser = if a.is_err() { a } else { b };
    match loser {
        Err(ApiError::Conflict(msg)) => assert_eq!(msg, DUPLICATE_MESSAGE),
        other => panic!("Expected duplicate conflict, got {:?}", other),
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certificates")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_issue_requires_existing_user_and_sub_course() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let unknown_user = state
        .certificate_service
        .issue(issue_request("missing-user", &sub_course.id))
        .await;
    assert!(matches!(unknown_user, Err(ApiError::NotFound(_))));

    let unknown_sub_course = state
        .certificate_service
        .issue(issue_request(&user.id, "missing-sub-course"))
        .await;
    assert!(matches!(unknown_sub_course, Err(ApiError::NotFound(_))));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_expiry_must_be_after_issue_date() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let mut request = issue_request(&user.id, &sub_course.id);
    request.expiry_date = Some(date(2024, 3, 15));

    match state.certificate_service.issue(request).await {
        Err(ApiError::Unprocessable { errors, .. }) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "expiry_date");
        }
        other => panic!("Expected validation error, got {:?}", other),
    }

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_update_changes_dates_but_never_the_code() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;
    let (_, other_sub_course) = create_course_with_sub_course(db, "Painting", "Primer").await;

    let mut request = issue_request(&user.id, &sub_course.id);
    request.expiry_date = Some(date(2025, 3, 15));
    let certificate = state.certificate_service.issue(request).await.unwrap();

    let updated = state
        .certificate_service
        .update(
            &certificate.id,
            UpdateCertificateRequest {
                sub_course_id: Some(other_sub_course.id.clone()),
                issue_date: Some(date(2024, 3, 1)),
                expiry_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.certificate_code, certificate.certificate_code);
    assert_eq!(updated.sub_course_id, other_sub_course.id);
    assert_eq!(updated.issue_date, date(2024, 3, 1));
    assert_eq!(updated.expiry_date, None);

    let stored = state.certificate_service.get(&certificate.id).await.unwrap();
    assert_eq!(stored.sub_course_id, other_sub_course.id);
    assert_eq!(stored.expiry_date, None);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_update_rejects_bad_dates_and_taken_pairs() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, first_sub) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;
    let (_, second_sub) = create_course_with_sub_course(db, "Painting", "Primer").await;

    let first = state
        .certificate_service
        .issue(issue_request(&user.id, &first_sub.id))
        .await
        .unwrap();
    state
        .certificate_service
        .issue(issue_request(&user.id, &second_sub.id))
        .await
        .unwrap();

    // Expiry before the stored issue date
    let bad_dates = state
        .certificate_service
        .update(
            &first.id,
            UpdateCertificateRequest {
                expiry_date: Some(Some(date(2024, 1, 1))),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_dates, Err(ApiError::Unprocessable { .. })));

    // Moving onto a pair that already has a certificate
    let taken = state
        .certificate_service
        .update(
            &first.id,
            UpdateCertificateRequest {
                sub_course_id: Some(second_sub.id.clone()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(taken, Err(ApiError::Conflict(_))));

    let missing = state
        .certificate_service
        .update("missing", UpdateCertificateRequest::default())
        .await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_list_by_user_is_newest_first_and_active_only() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = build_test_state(db, fixed_clock(2024, 3, 15));

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, older_sub) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;
    let (_, newer_sub) = create_course_with_sub_course(db, "Painting", "Primer").await;
    let (_, hidden_sub) = create_course_with_sub_course(db, "Plumbing", "Pipes").await;

    let mut older = issue_request(&user.id, &older_sub.id);
    older.issue_date = date(2023, 6, 1);
    let older = state.certificate_service.issue(older).await.unwrap();

    let mut newer = issue_request(&user.id, &newer_sub.id);
    newer.issue_date = date(2024, 2, 1);
    let newer = state.certificate_service.issue(newer).await.unwrap();

    let hidden = state
        .certificate_service
        .issue(issue_request(&user.id, &hidden_sub.id))
        .await
        .unwrap();
    state
        .certificate_service
        .update(
            &hidden.id,
            UpdateCertificateRequest {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let listed = state.certificate_service.list_by_user(&user.id).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);

    let unknown = state.certificate_service.list_by_user("missing").await;
    assert!(matches!(unknown, Err(ApiError::NotFound(_))));

    teardown_test_db(test_db).await;
}

/// Delegates to the database but reports a code collision for the first `collisions` inserts.
struct CollidingRepository {
    inner: Database,
    collisions: u32,
    attempts: AtomicU32,
}

#[async_trait]
impl CertificateRepository for CollidingRepository {
    async fn create_certificate(&self, certificate: &Certificate) -> DomainResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.collisions {
            return Err(DomainError::CertificateCodeCollision);
        }
        self.inner.create_certificate(certificate).await
    }

    async fn get_certificate_by_id(&self, id: &str) -> DomainResult<Option<Certificate>> {
        self.inner.get_certificate_by_id(id).await
    }

    async fn find_certificate_for_pair(
        &self,
        user_id: &str,
        sub_course_id: &str,
    ) -> DomainResult<Option<Certificate>> {
        self.inner.find_certificate_for_pair(user_id, sub_course_id).await
    }

    async fn find_active_certificate_by_code(
        &self,
        code: &str,
    ) -> DomainResult<Option<Certificate>> {
        self.inner.find_active_certificate_by_code(code).await
    }

    async fn list_active_certificates_for_user(
        &self,
        user_id: &str,
    ) -> DomainResult<Vec<Certificate>> {
        self.inner.list_active_certificates_for_user(user_id).await
    }

    async fn update_certificate(&self, certificate: &Certificate) -> DomainResult<()> {
        self.inner.update_certificate(certificate).await
    }

    async fn delete_certificate(&self, id: &str) -> DomainResult<bool> {
        self.inner.delete_certificate(id).await
    }
}

fn colliding_service(
    db: &Database,
    collisions: u32,
    max_attempts: u32,
) -> (CertificateService, Arc<CollidingRepository>) {
    let repo = Arc::new(CollidingRepository {
        inner: db.clone(),
        collisions,
        attempts: AtomicU32::new(0),
    });
    let clock = fixed_clock(2024, 3, 15);
    let generator = CertificateCodeGenerator::new("AW", clock.clone()).unwrap();
    let service = CertificateService::new(
        repo.clone(),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        generator,
        clock,
        max_attempts,
    );
    (service, repo)
}

#[tokio::test]
async fn test_code_collision_is_retried_with_a_fresh_code() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let (service, repo) = colliding_service(db, 2, 3);
    let certificate = service
        .issue(issue_request(&user.id, &sub_course.id))
        .await
        .unwrap();

    assert_eq!(repo.attempts.load(Ordering::SeqCst), 3);
    assert!(service.get(&certificate.id).await.is_ok());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_code_collisions_exhaust_attempts() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let (service, repo) = colliding_service(db, 10, 3);
    let result = service.issue(issue_request(&user.id, &sub_course.id)).await;

    match result {
        Err(ApiError::Conflict(msg)) => assert!(msg.contains("unique certificate code")),
        other => panic!("Expected conflict, got {:?}", other),
    }
    assert_eq!(repo.attempts.load(Ordering::SeqCst), 3);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_store_rejects_reused_code() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let first_user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let second_user = create_test_user(db, "Jane Roe", "jane@example.com", Role::User).await;
    let (_, sub_course) = create_course_with_sub_course(db, "Welding", "Arc Welding").await;

    let first = Certificate::new(
        "AW0001JWEL0324".to_string(),
        first_user.id.clone(),
        sub_course.id.clone(),
        date(2024, 3, 15),
        None,
        chrono::Utc::now(),
    );
    db.create_certificate(&first).await.unwrap();

    let clash = Certificate::new(
        "AW0001JWEL0324".to_string(),
        second_user.id.clone(),
        sub_course.id.clone(),
        date(2024, 3, 15),
        None,
        chrono::Utc::now(),
    );
    assert!(matches!(
        db.create_certificate(&clash).await,
        Err(DomainError::CertificateCodeCollision)
    ));

    let same_pair = Certificate::new(
        "AW0002JWEL0324".to_string(),
        first_user.id.clone(),
        sub_course.id.clone(),
        date(2024, 3, 15),
        None,
        chrono::Utc::now(),
    );
    assert!(matches!(
        db.create_certificate(&same_pair).await,
        Err(DomainError::DuplicateCertificate)
    ));

    teardown_test_db(test_db).await;
}
