pub mod api;
pub mod config;
pub mod db;
pub mod feed;
pub mod models;
pub mod schema;
pub mod store;

#[macro_use]
extern crate diesel;
