//! Clients for external collaborators

pub mod rates;

pub use rates::RateClient;
