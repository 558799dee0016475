pub mod cli;
pub mod component;
pub mod config;
pub mod signal;
pub mod tools;
