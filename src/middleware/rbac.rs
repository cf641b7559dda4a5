// src/middleware/rbac.rs
//
// Guardiões de permissão por tipo: cada rota declara a permissão que
// exige como um extractor. A checagem é uma operação de conjunto sobre
// os claims já validados, sem ida ao banco.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::ActorContext};

pub trait PermissionDef: Send + Sync + 'static {
    fn code() -> &'static str;
}

pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .extensions
            .get::<ActorContext>()
            .ok_or(AppError::InvalidToken)?;

        let required = T::code();
        if !actor.has_permission(required) {
            return Err(AppError::forbidden(format!(
                "você precisa da permissão '{required}' para realizar esta ação"
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// Permissões conhecidas
// ---

macro_rules! permission {
    ($name:ident, $code:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn code() -> &'static str {
                $code
            }
        }
    };
}

permission!(PermAdminManage, "admin.manage");
permission!(PermUserRead, "user.read");
permission!(PermUserRoleUpdate, "user.role.update");
permission!(PermSellerValidate, "seller.validate");
permission!(PermBuyerGroupRead, "buyer.group.read");
permission!(PermBuyerGroupManage, "buyer.group.manage");
permission!(PermProductRead, "product.read");
permission!(PermProductManage, "product.manage");
permission!(PermSupplierRead, "supplier.read");
permission!(PermSupplierManage, "supplier.manage");
permission!(PermSupplierRatingRead, "supplier.rating.read");
permission!(PermSupplierRatingManage, "supplier.rating.manage");
permission!(PermProcurementRead, "procurement.read");
permission!(PermProcurementManage, "procurement.manage");
permission!(PermInventoryUpdate, "inventory.update");
permission!(PermOrderRead, "order.read");
permission!(PermOrderCreate, "order.create");
permission!(PermOrderStatusUpdate, "order.status.update");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::models::auth::Role;

    #[test]
    fn permission_codes_match_seed() {
        assert_eq!(PermAdminManage::code(), "admin.manage");
        assert_eq!(PermOrderStatusUpdate::code(), "order.status.update");
        assert_eq!(PermBuyerGroupManage::code(), "buyer.group.manage");
    }

    #[test]
    fn actor_permission_check_is_a_set_lookup() {
        let actor = ActorContext {
            user_id: 1,
            roles: HashSet::from([Role::Seller]),
            permissions: HashSet::from(["inventory.update".to_string()]),
        };
        assert!(actor.has_permission(PermInventoryUpdate::code()));
        assert!(!actor.has_permission(PermAdminManage::code()));
    }
}
