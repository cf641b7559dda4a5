// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::bootstrap_admin,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::auth::update_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_roles,
        handlers::users::list_sellers,
        handlers::users::validate_seller,
        handlers::users::reassign_seller,
        handlers::users::my_buyer_group,
        handlers::users::buyer_group_options,
        handlers::users::ambassador_buyers,
        handlers::users::assign_buyer,
        handlers::users::remove_buyer,

        // --- Regions ---
        handlers::regions::list_regions,
        handlers::regions::get_region,
        handlers::regions::create_region,
        handlers::regions::update_region,
        handlers::regions::delete_region,
        handlers::regions::set_region_defaults,
        handlers::regions::regroup_locals,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::list_product_types,
        handlers::products::create_product_type,
        handlers::products::delete_product_type,

        // --- Suppliers ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::get_supplier,
        handlers::suppliers::create_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,
        handlers::suppliers::supplier_reviews,

        // --- Inventory ---
        handlers::inventory::list_inventory,
        handlers::inventory::create_inventory_item,
        handlers::inventory::update_inventory_quantity,
        handlers::inventory::delete_inventory_item,
        handlers::inventory::catalog,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,
        handlers::orders::list_order_groups,
        handlers::orders::get_order_group,

        // --- Procurement ---
        handlers::procurement::list_procurement,
        handlers::procurement::create_procurement,
        handlers::procurement::update_procurement_status,
        handlers::procurement::delete_procurement,
        handlers::procurement::push_to_inventory,
        handlers::procurement::submit_review,
        handlers::procurement::get_review,
    ),
    components(
        schemas(

            // --- Auth ---
            models::auth::Role,
            models::auth::BootstrapAdminPayload,
            models::auth::RegisterPayload,
            models::auth::ProfilePayload,
            models::auth::LoginPayload,
            models::auth::UserResponse,
            models::auth::UpdateRolesPayload,
            models::auth::SellerValidationPayload,
            models::auth::ReassignSellerPayload,
            models::auth::AssignBuyerPayload,
            models::auth::BuyerGroupResponse,
            models::auth::BuyerGroupOptionsResponse,
            models::auth::AuthResponse,

            // --- Regions ---
            models::region::RegionType,
            models::region::DistributionLevel,
            models::region::Region,
            models::region::RegionDefault,
            models::region::RegionPayload,
            models::region::RegionDefaultsPayload,
            models::region::RegroupLocalPayload,
            models::region::RegionResponse,

            // --- Products ---
            models::product::Product,
            models::product::ProductType,
            models::product::ProductPayload,
            models::product::ProductTypePayload,

            // --- Suppliers ---
            models::supplier::Supplier,
            models::supplier::SupplierProduct,
            models::supplier::SupplierPayload,
            models::supplier::SupplierProductLinkPayload,
            models::supplier::SupplierResponse,

            // --- Inventory ---
            models::inventory::InventoryKind,
            models::inventory::OriginType,
            models::inventory::CreateInventoryItemPayload,
            models::inventory::UpdateInventoryQuantityPayload,
            models::inventory::InventoryItemResponse,
            models::inventory::PaginationInfo,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::CreateOrderPayload,
            models::order::CreateOrderItemPayload,
            models::order::UpdateOrderStatusPayload,
            models::order::OrderItemResponse,
            models::order::OrderResponse,
            models::order::OrderGroupResponse,

            // --- Procurement ---
            models::procurement::ProcurementStatus,
            models::procurement::CreateProcurementOrderPayload,
            models::procurement::UpdateProcurementStatusPayload,
            models::procurement::ProcurementOrderResponse,
            models::procurement::ProcurementReviewResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Usuários e Papéis"),
        (name = "Sellers", description = "Validação de Sellers"),
        (name = "BuyerGroups", description = "Grupos de Compradores"),
        (name = "Regions", description = "Hierarquia de Regiões e Responsáveis Padrão"),
        (name = "Products", description = "Catálogo de Produtos e Tipos"),
        (name = "Suppliers", description = "Fornecedores e Avaliações"),
        (name = "Inventory", description = "Gestão de Estoque e Disponibilidade"),
        (name = "Orders", description = "Pedidos e Grupos de Pedidos"),
        (name = "Procurement", description = "Compras de Fornecedores")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
