pub mod adjustment;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod cooking;
pub mod detail;
pub mod favorites;
pub mod generator;
pub mod ingredients;
pub mod logging;
pub mod matcher;
pub mod normalizer;
pub mod plans;
pub mod recipe;
pub mod session;
pub mod store;
