// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::auth::Role};

/// A minimum role a route requires.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// Guard extractor: fails with 403 unless the caller's role includes `T`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        let required = T::role();
        if !user.0.role.includes(required) {
            return Err(AppError::Forbidden(format!(
                "This action requires the '{}' role",
                role_name(required)
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Vendor => "vendor",
        Role::Viewer => "viewer",
    }
}

// ---
// ROLES
// ---

pub struct RoleAdmin;
impl RoleDef for RoleAdmin {
    fn role() -> Role { Role::Admin }
}

pub struct RoleVendor;
impl RoleDef for RoleVendor {
    fn role() -> Role { Role::Vendor }
}
