pub mod aggregate;
pub mod error;
pub mod filter;
pub mod records;
pub mod service;
pub mod source;
