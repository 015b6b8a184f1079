pub mod bridge;
pub mod handle;
pub mod loader;
pub mod options;
pub mod session;
