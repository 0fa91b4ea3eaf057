mod helpers;

use coursehub::domain::entities::{Certificate, Course, Role, SubCourse, User};
use coursehub::domain::ports::certificate_repository::CertificateRepository;
use coursehub::domain::ports::course_repository::CourseRepository;
use coursehub::domain::ports::user_repository::UserRepository;
use helpers::*;

#[tokio::test]
async fn test_user_without_phone_reads_back() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let user = create_test_user(db, "John Doe", "john@example.com", Role::Admin).await;

    let by_id = db.get_user_by_id(&user.id).await.unwrap().unwrap();
    assert_eq!(by_id.phone, None);
    assert_eq!(by_id.role, Role::Admin);

    let by_email = db
        .get_user_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);

    let (users, total) = db.list_users(10, 0).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(users[0].phone, None);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_user_with_phone_reads_back() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let user = User::new(
        "Jane Roe".to_string(),
        "jane@example.com".to_string(),
        Some("+44 20 7946 0000".to_string()),
        Role::Writer,
        "unused-password-hash".to_string(),
    );
    db.create_user(&user).await.unwrap();

    let stored = db.get_user_by_id(&user.id).await.unwrap().unwrap();
    assert_eq!(stored.phone.as_deref(), Some("+44 20 7946 0000"));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_certificate_expiry_reads_back_absent_or_present() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let user = create_test_user(db, "John Doe", "john@example.com", Role::User).await;
    let (_, engine) = create_course_with_sub_course(db, "Engines", "Engine Basics").await;
    let (_, brakes) = create_course_with_sub_course(db, "Brakes", "Brake Basics").await;

    let open_ended = Certificate::new(
        "AW0001JENG0324".to_string(),
        user.id.clone(),
        engine.id.clone(),
        date(2024, 3, 15),
        None,
        chrono::Utc::now(),
    );
    db.create_certificate(&open_ended).await.unwrap();

    let expiring = Certificate::new(
        "AW0002JBRA0324".to_string(),
        user.id.clone(),
        brakes.id.clone(),
        date(2024, 3, 15),
        Some(date(2026, 3, 15)),
        chrono::Utc::now(),
    );
    db.create_certificate(&expiring).await.unwrap();

    let stored = db
        .get_certificate_by_id(&open_ended.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, open_ended);

    let stored = db
        .find_active_certificate_by_code("AW0002JBRA0324")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.expiry_date, Some(date(2026, 3, 15)));

    let listed = db.list_active_certificates_for_user(&user.id).await.unwrap();
    assert_eq!(listed.len(), 2);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_course_without_description_and_empty_sort_order() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    let course = Course::new("Welding".to_string(), "welding".to_string(), None);
    db.create_course(&course).await.unwrap();

    let stored = db.get_course_by_id(&course.id).await.unwrap().unwrap();
    assert_eq!(stored.description, None);
    assert_eq!(db.max_sub_course_sort_order(&course.id).await.unwrap(), None);

    let sub_course = SubCourse::new(
        course.id.clone(),
        "Arc Welding".to_string(),
        "arc-welding".to_string(),
        4,
    );
    db.create_sub_course(&sub_course).await.unwrap();
    assert_eq!(
        db.max_sub_course_sort_order(&course.id).await.unwrap(),
        Some(4)
    );

    teardown_test_db(test_db).await;
}
