pub mod auth;
pub mod inventory;
pub mod orders;
pub mod procurement;
pub mod products;
pub mod regions;
pub mod suppliers;
pub mod users;
