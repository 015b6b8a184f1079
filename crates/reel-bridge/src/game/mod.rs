pub mod banner;
pub mod bridge;
pub mod build;
pub mod device;
