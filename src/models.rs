pub mod branch;
pub mod warehouse;
