// src/config.rs

use std::{env, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        InventoryRepository, OrderRepository, ProcurementRepository, ProductRepository,
        RegionRepository, SupplierRepository, UserRepository,
    },
    services::{
        AuthService, ImageStore, InventoryService, OrderService, ProcurementService,
        ProductService, RegionService, ScopeService, SupplierService, UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub region_service: RegionService,
    pub product_service: ProductService,
    pub supplier_service: SupplierService,
    pub inventory_service: InventoryService,
    pub order_service: OrderService,
    pub procurement_service: ProcurementService,
    pub image_store: ImageStore,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("conexão com o banco de dados estabelecida");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let region_repo = RegionRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let supplier_repo = SupplierRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let procurement_repo = ProcurementRepository::new(db_pool.clone());
        let image_store = ImageStore::new(upload_dir);

        let auth_service = AuthService::new(
            user_repo.clone(),
            region_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let scope_service = ScopeService::new(user_repo.clone(), region_repo.clone());
        let user_service =
            UserService::new(user_repo.clone(), scope_service.clone(), db_pool.clone());
        let region_service =
            RegionService::new(region_repo, user_repo.clone(), db_pool.clone());
        let product_service = ProductService::new(product_repo.clone());
        let supplier_service = SupplierService::new(
            supplier_repo.clone(),
            product_repo.clone(),
            db_pool.clone(),
        );
        let inventory_service = InventoryService::new(
            inventory_repo.clone(),
            product_repo.clone(),
            user_repo.clone(),
            db_pool.clone(),
        );
        let order_service = OrderService::new(
            order_repo,
            inventory_repo.clone(),
            product_repo.clone(),
            user_repo,
            supplier_repo.clone(),
            scope_service,
            db_pool.clone(),
        );
        let procurement_service = ProcurementService::new(
            procurement_repo,
            inventory_repo,
            product_repo,
            supplier_repo,
            image_store.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            user_service,
            region_service,
            product_service,
            supplier_service,
            inventory_service,
            order_service,
            procurement_service,
            image_store,
        })
    }
}
