pub mod aws;
pub mod sinks;
pub mod tables;
pub mod vast;
