use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Course {
    pub fn new(title: String, slug: String, description: Option<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            slug,
            description,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A unit of curriculum nested under a course, ordered among its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCourse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub slug: String,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl SubCourse {
    pub fn new(course_id: String, title: String, slug: String, sort_order: i64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            course_id,
            title,
            slug,
            sort_order,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// ========== DTOs ==========

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubCourseRequest {
    pub title: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CourseWithSubCourses {
    #[serde(flatten)]
    pub course: Course,
    pub sub_courses: Vec<SubCourse>,
}
