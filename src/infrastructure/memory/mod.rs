//! In-process store implementations

pub mod scan_repository;

pub use scan_repository::InMemoryScanRepository;
