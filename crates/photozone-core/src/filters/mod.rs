pub mod enhance;
pub mod smooth;
