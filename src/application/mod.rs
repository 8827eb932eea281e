pub mod compile;
pub mod notify;
