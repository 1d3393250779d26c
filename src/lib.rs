// Library for tests to access modules

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod sampler;
pub mod version;
pub mod worker;
