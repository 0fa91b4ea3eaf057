use crate::domain::entities::{
    Course, CourseWithSubCourses, CreateCourseRequest, CreateSubCourseRequest, SubCourse,
};
use crate::infrastructure::http::middleware::{ApiResult, AppState, JsonBody};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

pub async fn create_course(
    State(state): State<AppState>,
    WithRejection(Json(request), _): JsonBody<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let course = state.course_service.create_course(request).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.course_service.list_courses().await?))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CourseWithSubCourses>> {
    Ok(Json(state.course_service.get_course(&id).await?))
}

pub async fn create_sub_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    WithRejection(Json(request), _): JsonBody<CreateSubCourseRequest>,
) -> ApiResult<(StatusCode, Json<SubCourse>)> {
    let sub_course = state
        .course_service
        .create_sub_course(&course_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(sub_course)))
}
