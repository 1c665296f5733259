pub mod auth;
mod contact;
mod google;
mod health_check;
mod jobs;

pub use auth::{get_current_user, login, logout, refresh, register};
pub use contact::submit_contact;
pub use google::{google_callback, google_login};
pub use health_check::health_check;
pub use jobs::{
    create_job, delete_job, get_job, list_jobs, list_saved_jobs, recent_jobs, save_job,
    unsave_job, update_job,
};
