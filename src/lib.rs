pub mod analyzers;
pub mod chart;
pub mod config;
pub mod distance;
pub mod error;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod ride;
