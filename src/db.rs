pub mod repositories;
pub use repositories::{BranchRepository, UserRepository, WarehouseRepository};
pub mod branch_repo;
pub use branch_repo::PgBranchRepository;
pub mod warehouse_repo;
pub use warehouse_repo::PgWarehouseRepository;
pub mod user_repo;
pub use user_repo::PgUserRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod memory_repo;
pub use memory_repo::MemoryRepository;
