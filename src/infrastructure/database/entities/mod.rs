//! Database entities module

pub mod scan;

pub use scan::Entity as Scan;
