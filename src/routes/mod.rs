pub mod auth;
pub mod csrf;
pub mod dashboard;
pub mod flash;
pub mod home;
