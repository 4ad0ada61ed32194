pub mod app;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod series;
pub mod ui;
pub mod view;
