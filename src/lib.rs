// Library for tests to access modules

pub mod config;
pub mod engine;
pub mod loader;
pub mod models;
pub mod publisher;
pub mod routes;
pub mod version;
pub mod worker;
