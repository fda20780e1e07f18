pub mod constants;
pub mod isa;
pub mod status;
