pub mod bus;
pub mod types;
