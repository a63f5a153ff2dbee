pub mod quote;
pub mod status;
