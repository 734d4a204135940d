pub mod handlers;
pub mod payment;
pub mod validation;
