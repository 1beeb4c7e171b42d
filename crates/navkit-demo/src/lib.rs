#![forbid(unsafe_code)]

//! navkit demo: a simulated colony with three keyboard-accessible menus.

pub mod app;
pub mod cli;
pub mod features;
pub mod host;
