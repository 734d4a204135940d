pub mod category;
pub mod form;
pub mod notification;
pub mod request;
pub mod user;
pub mod wallet;
