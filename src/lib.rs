pub mod config;
pub mod fetch;
pub mod predict;
pub mod report;
