pub mod admin;
pub mod aggregator;
pub mod builder;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod harness;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod sampler;
pub mod sources;
