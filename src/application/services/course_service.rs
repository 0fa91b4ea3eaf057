use crate::domain::entities::{
    Course, CourseWithSubCourses, CreateCourseRequest, CreateSubCourseRequest, SubCourse,
};
use crate::domain::errors::FieldError;
use crate::domain::ports::course_repository::CourseRepository;
use crate::domain::services::slug::{slug_candidates, slugify};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct CourseService {
    course_repo: Arc<dyn CourseRepository>,
}

fn require_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::Unprocessable {
            message: "The given data was invalid".to_string(),
            errors: vec![FieldError::new("title", "The title field is required")],
        });
    }
    Ok(title.to_string())
}

impl CourseService {
    pub fn new(course_repo: Arc<dyn CourseRepository>) -> Self {
        Self { course_repo }
    }

    pub async fn create_course(&self, request: CreateCourseRequest) -> ApiResult<Course> {
        let title = require_title(&request.title)?;
        let slug = self.unique_slug(&title, "course", false).await?;
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let course = Course::new(title, slug, description);
        self.course_repo.create_course(&course).await?;
        tracing::info!("Created course {} ({})", course.id, course.slug);

        Ok(course)
    }

    pub async fn get_course(&self, id: &str) -> ApiResult<CourseWithSubCourses> {
        let course = self
            .course_repo
            .get_course_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", id)))?;
        let sub_courses = self.course_repo.list_sub_courses(&course.id).await?;

        Ok(CourseWithSubCourses {
            course,
            sub_courses,
        })
    }

    pub async fn list_courses(&self) -> ApiResult<Vec<Course>> {
        Ok(self.course_repo.list_courses().await?)
    }

    /// Without an explicit `sort_order` the sub-course is appended after its siblings.
    pub async fn create_sub_course(
        &self,
        course_id: &str,
        request: CreateSubCourseRequest,
    ) -> ApiResult<SubCourse> {
        let title = require_title(&request.title)?;

        if self.course_repo.get_course_by_id(course_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("Course {} not found", course_id)));
        }

        let sort_order = match request.sort_order {
            Some(order) => order,
            None => {
                self.course_repo
                    .max_sub_course_sort_order(course_id)
                    .await?
                    .unwrap_or(0)
                    + 1
            }
        };
        let slug = self.unique_slug(&title, "sub-course", true).await?;

        let sub_course = SubCourse::new(course_id.to_string(), title, slug, sort_order);
        self.course_repo.create_sub_course(&sub_course).await?;

        Ok(sub_course)
    }

    async fn unique_slug(&self, title: &str, fallback: &str, sub_course: bool) -> ApiResult<String> {
        let mut base = slugify(title);
        if base.is_empty() {
            base = fallback.to_string();
        }

        for candidate in slug_candidates(&base).take(100) {
            let taken = if sub_course {
                self.course_repo.sub_course_slug_exists(&candidate).await?
            } else {
                self.course_repo.course_slug_exists(&candidate).await?
            };
            if !taken {
                return Ok(candidate);
            }
        }

        Err(ApiError::Conflict(format!(
            "Could not find a free slug for '{}'",
            title
        )))
    }
}
