pub mod app;
pub mod config;
pub mod rule_builder;
pub mod seed;
