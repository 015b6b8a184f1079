pub mod manual;
pub mod timer;
