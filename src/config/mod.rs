pub mod app;
pub mod env;
pub mod provider;
pub mod web;
