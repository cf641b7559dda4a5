//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é proposital: sem configuração válida a aplicação não sobe.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: bootstrap, registro e tokens.
    let auth_routes = Router::new()
        .route("/bootstrap-admin", post(handlers::auth::bootstrap_admin))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh));

    // Tudo daqui para baixo exige um token válido; as permissões finas
    // ficam nos extractors de cada handler.
    let protected_routes = Router::new()
        .route(
            "/api/auth/me",
            get(handlers::auth::me).patch(handlers::auth::update_me),
        )
        // --- Usuários ---
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/{user_id}", get(handlers::users::get_user))
        .route("/api/users/{user_id}/roles", put(handlers::users::update_roles))
        .route("/api/sellers", get(handlers::users::list_sellers))
        .route(
            "/api/sellers/{user_id}/validation",
            put(handlers::users::validate_seller),
        )
        .route(
            "/api/sellers/{user_id}/assigned-admin",
            put(handlers::users::reassign_seller),
        )
        // --- Grupos de compra ---
        .route("/api/buyer-groups/mine", get(handlers::users::my_buyer_group))
        .route(
            "/api/buyer-groups/options",
            get(handlers::users::buyer_group_options),
        )
        .route(
            "/api/buyer-groups/assignments",
            post(handlers::users::assign_buyer).delete(handlers::users::remove_buyer),
        )
        .route(
            "/api/ambassadors/{ambassador_user_id}/buyers",
            get(handlers::users::ambassador_buyers),
        )
        // --- Regiões ---
        .route(
            "/api/regions",
            get(handlers::regions::list_regions).post(handlers::regions::create_region),
        )
        .route(
            "/api/regions/regroup-locals",
            post(handlers::regions::regroup_locals),
        )
        .route(
            "/api/regions/{region_id}",
            get(handlers::regions::get_region)
                .put(handlers::regions::update_region)
                .delete(handlers::regions::delete_region),
        )
        .route(
            "/api/regions/{region_id}/defaults",
            put(handlers::regions::set_region_defaults),
        )
        // --- Produtos ---
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/{product_id}",
            put(handlers::products::update_product).delete(handlers::products::delete_product),
        )
        .route(
            "/api/product-types",
            get(handlers::products::list_product_types)
                .post(handlers::products::create_product_type),
        )
        .route(
            "/api/product-types/{product_type_id}",
            delete(handlers::products::delete_product_type),
        )
        // --- Fornecedores ---
        .route(
            "/api/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route(
            "/api/suppliers/{supplier_id}",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        .route(
            "/api/suppliers/{supplier_id}/reviews",
            get(handlers::suppliers::supplier_reviews),
        )
        // --- Estoque ---
        .route(
            "/api/inventory",
            get(handlers::inventory::list_inventory)
                .post(handlers::inventory::create_inventory_item),
        )
        .route(
            "/api/inventory/{inventory_kind}/{item_id}/quantity",
            put(handlers::inventory::update_inventory_quantity),
        )
        .route(
            "/api/inventory/{inventory_kind}/{item_id}",
            delete(handlers::inventory::delete_inventory_item),
        )
        .route("/api/catalog", get(handlers::inventory::catalog))
        // --- Pedidos ---
        .route(
            "/api/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/api/orders/{order_id}", get(handlers::orders::get_order))
        .route(
            "/api/orders/{order_id}/status",
            put(handlers::orders::update_order_status),
        )
        .route("/api/order-groups", get(handlers::orders::list_order_groups))
        .route(
            "/api/order-groups/{order_group_id}",
            get(handlers::orders::get_order_group),
        )
        // --- Compras de fornecedores ---
        .route(
            "/api/procurement",
            get(handlers::procurement::list_procurement)
                .post(handlers::procurement::create_procurement),
        )
        .route(
            "/api/procurement/{procurement_id}",
            delete(handlers::procurement::delete_procurement),
        )
        .route(
            "/api/procurement/{procurement_id}/status",
            put(handlers::procurement::update_procurement_status),
        )
        .route(
            "/api/procurement/{procurement_id}/push-to-inventory",
            post(handlers::procurement::push_to_inventory),
        )
        .route(
            "/api/procurement/{procurement_id}/review",
            get(handlers::procurement::get_review).post(handlers::procurement::submit_review),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/uploads/{*path}", get(handlers::procurement::serve_upload))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
