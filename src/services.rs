pub mod branch_service;
pub use branch_service::BranchService;
pub mod warehouse_service;
pub use warehouse_service::WarehouseService;
