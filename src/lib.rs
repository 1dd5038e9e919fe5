pub mod app;
pub mod browse;
pub mod catalog;
pub mod config;
pub mod details;
pub mod http;
pub mod images;
pub mod models;
pub mod prefs;
pub mod routes;
pub mod socket;
pub mod suggest;
pub mod tmdb;
pub mod views;
