pub mod capture;
pub mod config;
pub mod realtime;
pub mod runner;
