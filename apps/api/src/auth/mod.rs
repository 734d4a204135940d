pub mod extractor;
pub mod handlers;
pub mod password;
pub mod service;

pub use extractor::CurrentUser;
