use crate::domain::entities::{Course, SubCourse};
use crate::domain::errors::DomainResult;
use crate::domain::ports::course_repository::CourseRepository;
use crate::infrastructure::persistence::{nullable_text, Database};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

fn course_from_row(row: &AnyRow) -> DomainResult<Course> {
    Ok(Course {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: nullable_text(row, "description"),
        active: row.try_get::<i64, _>("active")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn sub_course_from_row(row: &AnyRow) -> DomainResult<SubCourse> {
    Ok(SubCourse {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CourseRepository for Database {
    async fn create_course(&self, course: &Course) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO courses (id, title, slug, description, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&course.id)
        .bind(&course.title)
        .bind(&course.slug)
        .bind(&course.description)
        .bind(if course.active { 1i64 } else { 0i64 })
        .bind(&course.created_at)
        .bind(&course.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_course_by_id(&self, id: &str) -> DomainResult<Option<Course>> {
        let row = sqlx::query(
            "SELECT id, title, slug, description, active, created_at, updated_at
             FROM courses
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(course_from_row).transpose()
    }

    async fn list_courses(&self) -> DomainResult<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT id, title, slug, description, active, created_at, updated_at
             FROM courses
             ORDER BY title ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    async fn course_slug_exists(&self, slug: &str) -> DomainResult<bool> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM courses WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        Ok(count > 0)
    }

    async fn create_sub_course(&self, sub_course: &SubCourse) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO sub_courses (id, course_id, title, slug, sort_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sub_course.id)
        .bind(&sub_course.course_id)
        .bind(&sub_course.title)
        .bind(&sub_course.slug)
        .bind(sub_course.sort_order)
        .bind(&sub_course.created_at)
        .bind(&sub_course.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_sub_course_by_id(&self, id: &str) -> DomainResult<Option<SubCourse>> {
        let row = sqlx::query(
            "SELECT id, course_id, title, slug, sort_order, created_at, updated_at
             FROM sub_courses
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(sub_course_from_row).transpose()
    }

    async fn list_sub_courses(&self, course_id: &str) -> DomainResult<Vec<SubCourse>> {
        let rows = sqlx::query(
            "SELECT id, course_id, title, slug, sort_order, created_at, updated_at
             FROM sub_courses
             WHERE course_id = ?
             ORDER BY sort_order ASC, title ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(sub_course_from_row).collect()
    }

    async fn max_sub_course_sort_order(&self, course_id: &str) -> DomainResult<Option<i64>> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count, COALESCE(MAX(sort_order), 0) as max_order \
             FROM sub_courses WHERE course_id = ?",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        if count == 0 {
            return Ok(None);
        }
        Ok(Some(row.try_get("max_order")?))
    }

    async fn sub_course_slug_exists(&self, slug: &str) -> DomainResult<bool> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM sub_courses WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        Ok(count > 0)
    }
}
