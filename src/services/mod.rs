pub mod analysis;
pub mod data_service;
pub mod scheduler;
