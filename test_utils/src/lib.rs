pub mod epid;
#[macro_use]
pub mod serialization;
