//! Routes whose behaviour the gateway measures.

pub mod generate;

pub use generate::generate;
