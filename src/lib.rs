pub mod analyzers;
pub mod builder;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod output;
pub mod parser;
pub mod snapshot;
pub mod stats;
