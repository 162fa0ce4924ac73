pub mod dataset;
pub mod service;
pub mod session;
pub mod sessions;
