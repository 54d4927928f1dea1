pub mod branches;
pub mod health;
pub mod warehouses;
