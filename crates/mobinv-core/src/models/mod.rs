//! Data models and configuration.

pub mod config;
pub mod embedded;
pub mod imei;
pub mod invoice;
pub mod lexicon;
