//! User Entity
//!
//! A marketplace account. Buyers and sellers share one table; `is_seller`
//! and the optional seller profile distinguish them.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::UserId;
use kernel::patch::{apply, double_option};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::UserPassword, user_role::UserRole,
};

/// Optional seller/contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub address_number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub profile_picture: Option<String>,
    pub company_name: Option<String>,
}

/// Partial update of [`SellerProfile`]; `null` clears a field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfilePatch {
    #[serde(default, deserialize_with = "double_option")]
    pub cpf: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cnpj: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub complement: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub neighborhood: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub zip_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub company_name: Option<Option<String>>,
}

impl SellerProfilePatch {
    pub fn apply_to(self, profile: &mut SellerProfile) {
        apply(&mut profile.cpf, self.cpf);
        apply(&mut profile.cnpj, self.cnpj);
        apply(&mut profile.phone, self.phone);
        apply(&mut profile.birth_date, self.birth_date);
        apply(&mut profile.address, self.address);
        apply(&mut profile.address_number, self.address_number);
        apply(&mut profile.complement, self.complement);
        apply(&mut profile.neighborhood, self.neighborhood);
        apply(&mut profile.city, self.city);
        apply(&mut profile.state, self.state);
        apply(&mut profile.zip_code, self.zip_code);
        apply(&mut profile.profile_picture, self.profile_picture);
        apply(&mut profile.company_name, self.company_name);
    }
}

/// Persisted user
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub email: Email,
    pub password: UserPassword,
    pub role: UserRole,
    pub is_active: bool,
    pub is_seller: bool,
    pub profile: SellerProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Inactive accounts are rejected by login and by the request gate
    #[inline]
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn change_password(&mut self, password: UserPassword, now: DateTime<Utc>) {
        self.password = password;
        self.updated_at = now;
    }

    /// Soft delete
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// A user that has not been stored yet (no id)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: UserName,
    pub email: Email,
    pub password: UserPassword,
    pub role: UserRole,
    pub is_seller: bool,
    pub profile: SellerProfile,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Registration defaults: role `user`, active, not a seller
    pub fn register(
        name: UserName,
        email: Email,
        password: UserPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            email,
            password,
            role: UserRole::User,
            is_seller: false,
            profile: SellerProfile::default(),
            created_at: now,
        }
    }

    /// Attach the database-assigned id
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            role: self.role,
            is_active: true,
            is_seller: self.is_seller,
            profile: self.profile,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
