pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod fitness;
pub mod generator;
pub mod json;
pub mod recipes;
pub mod state;
pub mod store;
