/// Authentication module
///
/// Token codec, password hashing, the refresh-token ledger, and the
/// service that orchestrates them.

mod claims;
mod password;
mod refresh_token;
mod service;
mod token;

pub use claims::Claims;
pub use claims::TokenType;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::consume_refresh_token;
pub use refresh_token::revoke_all_user_tokens;
pub use refresh_token::save_refresh_token;
pub use refresh_token::StoredRefreshToken;
pub use service::find_or_create_google_user;
pub use service::issue_token_pair;
pub use service::login;
pub use service::redeem_refresh_token;
pub use service::register;
pub use service::SignupCredential;
pub use service::TokenPair;
pub use service::TokenWithExpiry;
pub use token::issue_token;
pub use token::verify_token;
