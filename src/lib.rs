pub mod budget;
pub mod category;
pub mod config;
pub mod db;
pub mod errors;
pub mod extractors;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod transaction;
pub mod user;
