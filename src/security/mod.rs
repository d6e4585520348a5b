/// Security primitives for the account service
///
/// - `password`: Argon2id hashing and verification
/// - `signature`: HMAC-SHA256 Telegram login-signature check
/// - `jwt`: access/refresh token minting and parsing
/// - `token_revocation`: Redis jti blacklist with per-user index
pub mod jwt;
pub mod password;
pub mod signature;
pub mod token_revocation;

pub use jwt::{Claims, MintedPair, TokenCodec};
pub use password::{hash_password, verify_password};
pub use signature::verify_signature;
pub use token_revocation::{remaining_ttl, TokenBlacklist};
