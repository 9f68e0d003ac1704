//! Payment gateway implementations

pub mod iugu;

pub use iugu::IuguProvider;
