//! Pipeline stages, persistence ports, and configuration loading.

pub mod aggregator;
pub mod collector;
pub mod config;
pub mod kv;
pub mod logger;
pub mod normalizer;
pub mod readiness;
pub mod repository;
pub mod scoring;
pub mod upload;
