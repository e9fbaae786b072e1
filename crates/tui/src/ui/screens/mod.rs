pub mod dashboard;
pub mod history;
pub mod home;
pub mod login;
