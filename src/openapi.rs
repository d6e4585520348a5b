/// OpenAPI document aggregating every handler
use utoipa::OpenApi;

use crate::handlers::{auth, users};
use crate::models::{
    LoginRequest, RegisterRequest, ResetPasswordRequest, RoleUpdateRequest, TelegramLoginRequest,
    TokenPair, UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        auth::signup,
        auth::login,
        auth::login_telegram,
        auth::refresh,
        auth::verify,
        auth::reset_password,
        auth::logout,
        auth::logout_all,
        users::list_users,
        users::get_user,
        users::deactivate_user,
        users::activate_user,
        users::update_role,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        TelegramLoginRequest,
        ResetPasswordRequest,
        RoleUpdateRequest,
        TokenPair,
        UserResponse,
        auth::ErrorResponse,
        auth::MessageResponse,
    )),
    tags(
        (name = "Auth", description = "Session lifecycle"),
        (name = "Users", description = "User administration"),
        (name = "Health", description = "Service probes")
    )
)]
pub struct ApiDoc;
