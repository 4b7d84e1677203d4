pub mod mock;
pub mod psa;
