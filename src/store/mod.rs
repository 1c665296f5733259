/// Persistent store module
///
/// User records and the queries the auth layer depends on. The unique
/// index on `users.email` is the authority for email uniqueness.

mod users;

pub use users::is_email_taken;
pub use users::find_user_by_email;
pub use users::find_user_by_id;
pub use users::insert_user;
pub use users::AuthProvider;
pub use users::Credential;
pub use users::User;
