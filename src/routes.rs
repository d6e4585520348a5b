/// Route table for the service
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::handlers::{auth, health, users};
use crate::openapi::ApiDoc;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/login/telegram", post(auth::login_telegram))
        .route("/refresh", post(auth::refresh))
        .route("/verify", post(auth::verify))
        .route("/reset-password", post(auth::reset_password))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/:id", get(users::get_user).delete(users::deactivate_user))
        .route("/:id/activate", post(users::activate_user))
        .route("/:id/role", patch(users::update_role));

    Router::new()
        .route("/health", get(health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/users", user_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
