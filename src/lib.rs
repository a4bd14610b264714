pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod controller;
pub mod loader;
pub mod output;
pub mod prefs;
pub mod query;
pub mod stats;
pub mod view;

#[cfg(test)]
mod tests;
