//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::UserId;
use sqlx::PgPool;

use crate::domain::entity::user::{NewUser, SellerProfile, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// `SELECT <all user columns> FROM users <tail>`
macro_rules! select_users {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT
                id, name, email, password_hash, role, is_active, is_seller,
                cpf, cnpj, phone, birth_date, address, address_number, complement,
                neighborhood, city, state, zip_code, profile_picture, company_name,
                created_at, updated_at
            FROM users
            "#,
            $tail
        )
    };
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations on `users.email` become `EmailTaken`
fn map_write_error(e: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AuthError::EmailTaken;
        }
    }
    AuthError::Database(e)
}

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let p = &user.profile;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (
                name, email, password_hash, role, is_active, is_seller,
                cpf, cnpj, phone, birth_date, address, address_number, complement,
                neighborhood, city, state, zip_code, profile_picture, company_name,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, TRUE, $5,
                $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18,
                $19, $19
            )
            RETURNING id
            "#,
        )
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.role.code())
        .bind(user.is_seller)
        .bind(&p.cpf)
        .bind(&p.cnpj)
        .bind(&p.phone)
        .bind(p.birth_date)
        .bind(&p.address)
        .bind(&p.address_number)
        .bind(&p.complement)
        .bind(&p.neighborhood)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.zip_code)
        .bind(&p.profile_picture)
        .bind(&p.company_name)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(user.clone().into_user(UserId::from_i64(id)))
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(select_users!("WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(select_users!("WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_all(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(select_users!("ORDER BY created_at DESC, id DESC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let p = &user.profile;
        sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                email = $3,
                password_hash = $4,
                role = $5,
                is_active = $6,
                is_seller = $7,
                cpf = $8,
                cnpj = $9,
                phone = $10,
                birth_date = $11,
                address = $12,
                address_number = $13,
                complement = $14,
                neighborhood = $15,
                city = $16,
                state = $17,
                zip_code = $18,
                profile_picture = $19,
                company_name = $20,
                updated_at = $21
            WHERE id = $1
            "#,
        )
        .bind(user.id.value())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.role.code())
        .bind(user.is_active)
        .bind(user.is_seller)
        .bind(&p.cpf)
        .bind(&p.cnpj)
        .bind(&p.phone)
        .bind(p.birth_date)
        .bind(&p.address)
        .bind(&p.address_number)
        .bind(&p.complement)
        .bind(&p.neighborhood)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.zip_code)
        .bind(&p.profile_picture)
        .bind(&p.company_name)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn delete(&self, id: UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    is_seller: bool,
    cpf: Option<String>,
    cnpj: Option<String>,
    phone: Option<String>,
    birth_date: Option<NaiveDate>,
    address: Option<String>,
    address_number: Option<String>,
    complement: Option<String>,
    neighborhood: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    profile_picture: Option<String>,
    company_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role: {}", self.role)))?;

        Ok(User {
            id: UserId::from_i64(self.id),
            name: UserName::from_db(self.name),
            email: Email::from_db(self.email),
            password: UserPassword::from_phc_string(self.password_hash)?,
            role,
            is_active: self.is_active,
            is_seller: self.is_seller,
            profile: SellerProfile {
                cpf: self.cpf,
                cnpj: self.cnpj,
                phone: self.phone,
                birth_date: self.birth_date,
                address: self.address,
                address_number: self.address_number,
                complement: self.complement,
                neighborhood: self.neighborhood,
                city: self.city,
                state: self.state,
                zip_code: self.zip_code,
                profile_picture: self.profile_picture,
                company_name: self.company_name,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
