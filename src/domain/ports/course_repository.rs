use crate::domain::entities::{Course, SubCourse};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create_course(&self, course: &Course) -> DomainResult<()>;
    async fn get_course_by_id(&self, id: &str) -> DomainResult<Option<Course>>;
    async fn list_courses(&self) -> DomainResult<Vec<Course>>;
    async fn course_slug_exists(&self, slug: &str) -> DomainResult<bool>;

    async fn create_sub_course(&self, sub_course: &SubCourse) -> DomainResult<()>;
    async fn get_sub_course_by_id(&self, id: &str) -> DomainResult<Option<SubCourse>>;
    /// Ordered by `sort_order`, then title.
    async fn list_sub_courses(&self, course_id: &str) -> DomainResult<Vec<SubCourse>>;
    async fn max_sub_course_sort_order(&self, course_id: &str) -> DomainResult<Option<i64>>;
    async fn sub_course_slug_exists(&self, slug: &str) -> DomainResult<bool>;
}
