// Application layer - Use cases over the domain
pub mod dataset_repository;
pub mod loader_service;
pub mod view_service;
