pub mod health;
pub mod login;
pub mod reports;
pub mod users;
