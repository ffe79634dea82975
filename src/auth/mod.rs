pub mod credentials;
pub mod jwt;
pub mod principal;
pub mod resolver;
pub mod role;
