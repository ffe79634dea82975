pub mod auth;
pub mod fallback;
pub mod pages;
pub mod router;
pub mod state;
pub mod template;
