pub mod hash;
pub mod store;
