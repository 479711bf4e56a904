pub mod auth;
pub mod privileges;
pub mod users;
