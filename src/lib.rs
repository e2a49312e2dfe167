pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod notify;
pub mod pipeline;
pub mod readings;
pub mod triggers;
