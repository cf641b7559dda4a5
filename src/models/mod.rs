pub mod auth;
pub mod inventory;
pub mod order;
pub mod procurement;
pub mod product;
pub mod region;
pub mod supplier;
