pub mod user;

pub use user::{
    LoginRequest, NewUser, RegisterRequest, ResetPasswordRequest, RoleUpdateRequest,
    TelegramLoginRequest, TokenPair, User, UserResponse,
};
