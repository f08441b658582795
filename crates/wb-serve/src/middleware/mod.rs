pub mod caller;
pub mod correlation;
