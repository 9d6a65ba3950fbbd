pub mod api;
pub mod browser;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod models;
pub mod seed;
