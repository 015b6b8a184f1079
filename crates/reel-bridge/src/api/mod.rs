pub mod hooks;
pub mod types;
