// Accounts: registration, login/logout and the admin seed.

pub mod handlers;
pub mod password;
pub mod store;
