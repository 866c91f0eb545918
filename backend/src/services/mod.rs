//! Business logic services for the Construction Procurement Platform

pub mod invoice;
pub mod order;
pub mod payment;
pub mod progress_payment;
pub mod quote;
pub mod stock;
pub mod supplier;

pub use invoice::InvoiceService;
pub use order::OrderService;
pub use payment::PaymentService;
pub use progress_payment::ProgressPaymentService;
pub use quote::QuoteService;
pub use stock::StockService;
pub use supplier::SupplierService;
