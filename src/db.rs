pub mod user_repo;
pub use user_repo::UserRepository;
pub mod region_repo;
pub use region_repo::RegionRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod procurement_repo;
pub use procurement_repo::ProcurementRepository;
