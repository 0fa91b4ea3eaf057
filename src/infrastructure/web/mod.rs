use crate::infrastructure::http::middleware::{
    ApiError, AppState, AuthenticatedUser, SESSION_COOKIE,
};
use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

// Template structs
#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: Option<String>,
    email: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    title: String,
    user_name: String,
    user_email: String,
    role_name: String,
    permissions: Vec<String>,
    certificates: Vec<DashboardCertificate>,
}

struct DashboardCertificate {
    code: String,
    issue_date: String,
    expiry_date: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

// Handlers
pub async fn show_login_page() -> impl IntoResponse {
    HtmlTemplate(LoginTemplate {
        error: None,
        email: String::new(),
    })
}

pub async fn handle_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let auth_result = match state
        .auth_service
        .authenticate(&form.email, &form.password)
        .await
    {
        Ok(result) => result,
        Err(err) => {
            let (status, message) = match err {
                ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
                ApiError::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    "Invalid email or password".to_string(),
                ),
                other => {
                    tracing::error!("Login failed: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Something went wrong, please try again".to_string(),
                    )
                }
            };
            let page = HtmlTemplate(LoginTemplate {
                error: Some(message),
                email: form.email,
            });
            return (status, page).into_response();
        }
    };

    tracing::info!("Login successful for user {}", auth_result.user.email);

    (
        [(
            header::SET_COOKIE,
            format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                SESSION_COOKIE,
                auth_result.session.token,
                state.session_duration_hours * 3600
            ),
        )],
        Redirect::to(&auth_result.redirect_to),
    )
        .into_response()
}

pub async fn handle_logout(
    State(state): State<AppState>,
    auth_user: Option<Extension<AuthenticatedUser>>,
) -> impl IntoResponse {
    if let Some(Extension(auth_user)) = auth_user {
        tracing::info!("Logout for user {}", auth_user.user.id);
        if let Err(e) = state.auth_service.logout(&auth_user.token).await {
            tracing::error!("Failed to delete session on logout: {}", e);
        }
    }

    (
        [(
            header::SET_COOKIE,
            format!(
                "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
                SESSION_COOKIE
            ),
        )],
        Redirect::to("/login"),
    )
}

/// `/` sends signed-in users to their own area and everyone else to the login page.
pub async fn show_home(
    State(state): State<AppState>,
    auth_user: Option<Extension<AuthenticatedUser>>,
) -> Redirect {
    match auth_user {
        Some(Extension(auth_user)) => Redirect::to(state.registry.landing_path(auth_user.role())),
        None => Redirect::to("/login"),
    }
}

pub async fn show_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Response {
    let certificates = match state
        .certificate_service
        .list_by_user(&auth_user.user.id)
        .await
    {
        Ok(certificates) => certificates
            .into_iter()
            .map(|c| DashboardCertificate {
                code: c.certificate_code,
                issue_date: c.issue_date.to_string(),
                expiry_date: c
                    .expiry_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect(),
        Err(e) => {
            tracing::error!("Failed to load certificates for dashboard: {}", e);
            Vec::new()
        }
    };

    render_dashboard(&state, &auth_user, "Dashboard", certificates)
}

pub async fn show_admin_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Response {
    render_dashboard(&state, &auth_user, "Admin dashboard", Vec::new())
}

pub async fn show_moderator_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Response {
    render_dashboard(&state, &auth_user, "Moderator dashboard", Vec::new())
}

pub async fn show_writer_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Response {
    render_dashboard(&state, &auth_user, "Writer dashboard", Vec::new())
}

fn render_dashboard(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    title: &str,
    certificates: Vec<DashboardCertificate>,
) -> Response {
    let role = auth_user.role();
    let template = DashboardTemplate {
        title: title.to_string(),
        user_name: auth_user.user.name.clone(),
        user_email: auth_user.user.email.clone(),
        role_name: role.to_string(),
        permissions: state
            .registry
            .permissions(role)
            .iter()
            .map(|p| p.to_string())
            .collect(),
        certificates,
    };

    HtmlTemplate(template).into_response()
}

// Helper to render Askama templates
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}
