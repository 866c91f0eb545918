//! HTTP handlers for the Construction Procurement Platform

pub mod health;
pub mod invoice;
pub mod order;
pub mod payment;
pub mod progress_payment;
pub mod quote;
pub mod stock;
pub mod supplier;

pub use health::*;
pub use invoice::*;
pub use order::*;
pub use payment::*;
pub use progress_payment::*;
pub use quote::*;
pub use stock::*;
pub use supplier::*;
