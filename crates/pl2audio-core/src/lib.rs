pub mod config;
pub mod logging;

pub mod batch;
pub mod error;
pub mod fetch;
pub mod partition;
pub mod report;
pub mod resolver;
pub mod tools;
pub mod transcode;
