pub mod login;
pub mod logout;
pub mod register;
pub mod validate_session;
