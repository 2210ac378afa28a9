pub mod config;
pub mod logging;

pub mod capacity;
pub mod control;
pub mod runner;
pub mod site;
pub mod store;
