//! Domain models for the Construction Procurement Platform

mod invoice;
mod material;
mod order;
mod payment;
mod progress_payment;
mod quote;
mod stock;
mod supplier;
mod warehouse;

pub use invoice::*;
pub use material::*;
pub use order::*;
pub use payment::*;
pub use progress_payment::*;
pub use quote::*;
pub use stock::*;
pub use supplier::*;
pub use warehouse::*;
