pub mod auth;
pub use auth::AuthService;
pub mod scope_service;
pub use scope_service::ScopeService;
pub mod region_service;
pub use region_service::RegionService;
pub mod user_service;
pub use user_service::UserService;
pub mod product_service;
pub use product_service::ProductService;
pub mod supplier_service;
pub use supplier_service::SupplierService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod order_service;
pub use order_service::OrderService;
pub mod procurement_service;
pub use procurement_service::ProcurementService;
pub mod image_store;
pub use image_store::ImageStore;
