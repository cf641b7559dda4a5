// src/db/user_repo.rs

use std::collections::{HashMap, HashSet};

use sqlx::{Executor, PgPool, Postgres, Row};

use crate::{
    common::error::AppError,
    models::auth::{ProfilePayload, Role, User, UserWithRoles},
};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, user_id: i32) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn any_users_exist(&self) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users) AS present")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<bool, _>("present")?)
    }

    pub async fn roles_of<'e, E>(&self, executor: E, user_id: i32) -> Result<HashSet<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query(
            "SELECT r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        let mut roles = HashSet::new();
        for row in rows {
            let name: String = row.try_get("name")?;
            if let Some(role) = Role::parse(&name) {
                roles.insert(role);
            }
        }
        Ok(roles)
    }

    pub async fn permissions_of<'e, E>(
        &self,
        executor: E,
        user_id: i32,
    ) -> Result<HashSet<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query(
            "SELECT DISTINCT p.code FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             JOIN user_roles ur ON ur.role_id = rp.role_id \
             WHERE ur.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_get::<String, _>("code"))
            .collect::<Result<HashSet<_>, _>>()?)
    }

    pub async fn find_with_roles(&self, user_id: i32) -> Result<Option<UserWithRoles>, AppError> {
        let Some(user) = self.find_by_id(&self.pool, user_id).await? else {
            return Ok(None);
        };
        let roles = self.roles_of(&self.pool, user_id).await?;
        Ok(Some(UserWithRoles { user, roles }))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        profile: &ProfilePayload,
        seller_status: Option<&str>,
        source_region_id: Option<i32>,
        major_distribution_region_id: Option<i32>,
        assigned_admin_user_id: Option<i32>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, first_name, last_name, address_line1, address_line2, \
             address_line3, zip_code, phone_number, region, source_region_id, \
             major_distribution_region_id, assigned_admin_user_id, seller_status, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING *",
        )
        .bind(email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.address_line1)
        .bind(&profile.address_line2)
        .bind(&profile.address_line3)
        .bind(&profile.zip_code)
        .bind(&profile.phone_number)
        .bind(&profile.region)
        .bind(source_region_id)
        .bind(major_distribution_region_id)
        .bind(assigned_admin_user_id)
        .bind(seller_status)
        .bind(password_hash)
        .fetch_one(executor)
        .await;

        match result {
            Ok(user) => Ok(user),
            // Violação do UNIQUE de e-mail vira erro de domínio.
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::EmailAlreadyExists)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        profile: &ProfilePayload,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET first_name = $2, last_name = $3, address_line1 = $4, \
             address_line2 = $5, address_line3 = $6, zip_code = $7, phone_number = $8, \
             region = $9, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.address_line1)
        .bind(&profile.address_line2)
        .bind(&profile.address_line3)
        .bind(&profile.zip_code)
        .bind(&profile.phone_number)
        .bind(&profile.region)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn grant_role<'e, E>(&self, executor: E, user_id: i32, role: Role) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) \
             SELECT $1, id FROM roles WHERE name = $2 \
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_roles(
        &self,
        conn: &mut sqlx::PgConnection,
        user_id: i32,
        roles: &[Role],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        for role in roles {
            self.grant_role(&mut *conn, user_id, *role).await?;
        }
        Ok(())
    }

    pub async fn set_seller_status<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        status: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET seller_status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn set_assigned_admin(
        &self,
        user_id: i32,
        assigned_admin_user_id: i32,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET assigned_admin_user_id = $2, updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(assigned_admin_user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Lista todos os usuários com seus papéis (duas consultas, montagem
    /// em memória — ferramenta administrativa de baixa carga).
    pub async fn list_with_roles(&self) -> Result<Vec<UserWithRoles>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT ur.user_id, r.name FROM user_roles ur JOIN roles r ON r.id = ur.role_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut roles_by_user: HashMap<i32, HashSet<Role>> = HashMap::new();
        for row in rows {
            let user_id: i32 = row.try_get("user_id")?;
            let name: String = row.try_get("name")?;
            if let Some(role) = Role::parse(&name) {
                roles_by_user.entry(user_id).or_default().insert(role);
            }
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let roles = roles_by_user.remove(&user.id).unwrap_or_default();
                UserWithRoles { user, roles }
            })
            .collect())
    }

    pub async fn sellers_assigned_to(
        &self,
        admin_user_id: Option<i32>,
    ) -> Result<Vec<UserWithRoles>, AppError> {
        let all = self.list_with_roles().await?;
        Ok(all
            .into_iter()
            .filter(|u| u.has_role(Role::Seller))
            .filter(|u| match admin_user_id {
                Some(admin_id) => u.user.assigned_admin_user_id == Some(admin_id),
                None => true,
            })
            .collect())
    }

    /// Pares (buyer_id, major_distribution_region_id) de todos os usuários
    /// com papel buyer — insumo do resolvedor de escopo.
    pub async fn buyer_regions(&self) -> Result<Vec<(i32, Option<i32>)>, AppError> {
        let rows = sqlx::query(
            "SELECT u.id, u.major_distribution_region_id FROM users u \
             JOIN user_roles ur ON ur.user_id = u.id \
             JOIN roles r ON r.id = ur.role_id \
             WHERE r.name = 'buyer'",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok((
                    row.try_get::<i32, _>("id")?,
                    row.try_get::<Option<i32>, _>("major_distribution_region_id")?,
                ))
            })
            .collect()
    }

    // ---
    // Arestas embaixador <-> comprador
    // ---

    /// Criação idempotente: a aresta duplicada é um no-op, não um erro.
    pub async fn assign_buyer_to_ambassador<'e, E>(
        &self,
        executor: E,
        ambassador_user_id: i32,
        buyer_user_id: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO ambassador_buyer_assignments (ambassador_user_id, buyer_user_id) \
             VALUES ($1, $2) \
             ON CONFLICT (ambassador_user_id, buyer_user_id) DO NOTHING",
        )
        .bind(ambassador_user_id)
        .bind(buyer_user_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Retorna se a aresta existia.
    pub async fn remove_buyer_from_ambassador(
        &self,
        ambassador_user_id: i32,
        buyer_user_id: i32,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM ambassador_buyer_assignments \
             WHERE ambassador_user_id = $1 AND buyer_user_id = $2",
        )
        .bind(ambassador_user_id)
        .bind(buyer_user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn buyers_of_ambassador(
        &self,
        ambassador_user_id: i32,
    ) -> Result<Vec<User>, AppError> {
        let buyers = sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN ambassador_buyer_assignments a ON a.buyer_user_id = u.id \
             WHERE a.ambassador_user_id = $1 \
             ORDER BY u.id ASC",
        )
        .bind(ambassador_user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(buyers)
    }

    /// Todas as arestas (ambassador_user_id, buyer_user_id).
    pub async fn all_assignments(&self) -> Result<Vec<(i32, i32)>, AppError> {
        let rows = sqlx::query(
            "SELECT ambassador_user_id, buyer_user_id FROM ambassador_buyer_assignments",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok((
                    row.try_get::<i32, _>("ambassador_user_id")?,
                    row.try_get::<i32, _>("buyer_user_id")?,
                ))
            })
            .collect()
    }
}
