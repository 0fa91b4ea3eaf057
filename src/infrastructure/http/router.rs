use crate::domain::entities::Role;
use crate::infrastructure::http::controllers as api;
use crate::infrastructure::http::middleware::{load_principal, require_role, AppState, RoleGate};
use crate::infrastructure::web;
use crate::infrastructure::http::middleware::ApiError;
use axum::{
    http::{Method, Uri},
    middleware,
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Catch-all inside a role prefix, so unknown paths are still behind that prefix's guard.
async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    let registry = state.registry.clone();

    // Admin-only: certificate management, users, courses
    let admin = Router::new()
        .route("/certificates", post(api::certificates::issue_certificate))
        .route(
            "/certificates/:id",
            get(api::certificates::get_certificate)
                .patch(api::certificates::update_certificate)
                .delete(api::certificates::delete_certificate),
        )
        .route("/admin/dashboard", get(web::show_admin_dashboard))
        .route(
            "/admin/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/admin/users/:id",
            get(api::users::get_user).patch(api::users::update_user_access),
        )
        .route("/admin/roles", get(api::users::list_roles))
        .route(
            "/admin/courses",
            get(api::courses::list_courses).post(api::courses::create_course),
        )
        .route("/admin/courses/:id", get(api::courses::get_course))
        .route(
            "/admin/courses/:id/sub-courses",
            post(api::courses::create_sub_course),
        )
        .route("/admin/*rest", any(unknown_route))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::role(Role::Admin, registry.clone()),
            require_role,
        ));

    let moderator = Router::new()
        .route("/moderator/dashboard", get(web::show_moderator_dashboard))
        .route("/moderator/*rest", any(unknown_route))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::role(Role::Moderator, registry.clone()),
            require_role,
        ));

    let writer = Router::new()
        .route("/writer/dashboard", get(web::show_writer_dashboard))
        .route("/writer/*rest", any(unknown_route))
        .route_layer(middleware::from_fn_with_state(
            RoleGate::role(Role::Writer, registry.clone()),
            require_role,
        ));

    // Any signed-in principal
    let authenticated = Router::new()
        .route("/dashboard", get(web::show_dashboard))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/session", get(api::auth::get_session))
        .route(
            "/users/:user_id/certificates",
            get(api::certificates::list_user_certificates),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGate::authenticated(registry),
            require_role,
        ));

    // Public verification is meant to be embedded by third parties
    let verify = Router::new()
        .route(
            "/certificates/verify/:code",
            get(api::certificates::verify_certificate),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        );

    let public = Router::new()
        .route("/", get(web::show_home))
        .route("/health", get(|| async { "OK" }))
        .route(
            "/login",
            get(web::show_login_page).post(web::handle_login),
        )
        .route("/logout", get(web::handle_logout).post(web::handle_logout))
        .route("/api/auth/login", post(api::auth::login));

    Router::new()
        .merge(public)
        .merge(verify)
        .merge(authenticated)
        .merge(moderator)
        .merge(writer)
        .merge(admin)
        .layer(middleware::from_fn_with_state(state.clone(), load_principal))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
