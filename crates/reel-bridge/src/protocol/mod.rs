pub mod message;
pub mod origin;
