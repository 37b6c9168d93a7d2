pub mod models;
pub mod stripe;
pub mod traits;

#[cfg(test)]
pub mod fake;

pub use stripe::{StripeGateway, StripeSettings};
pub use traits::PaymentGateway;
