// src/utils/guard.rs

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::{error::AppError, models::user::Role};

/// Verified caller, injected into request extensions by `auth_middleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

/// Who may do what. Every role is listed explicitly; there is no hierarchy.
pub mod permissions {
    use crate::models::user::Role::{self, Admin, Student, Teacher};

    pub const AUTHOR_QUIZZES: &[Role] = &[Teacher, Admin];
    pub const VIEW_ANSWERS: &[Role] = &[Teacher, Admin];
    pub const SUBMIT_ANSWERS: &[Role] = &[Student, Teacher, Admin];
    pub const VIEW_QUIZ_RESULTS: &[Role] = &[Teacher, Admin];
    pub const TEACHER_DASHBOARD: &[Role] = &[Teacher, Admin];
    pub const MANAGE_USERS: &[Role] = &[Admin];
    pub const MANAGE_ANY_QUIZ: &[Role] = &[Admin];
    pub const SYSTEM_STATS: &[Role] = &[Admin];
}

/// Pure role-membership check.
pub fn authorize(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

impl Identity {
    /// Fails with `Forbidden` unless the caller's role is in `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        if authorize(self.role, allowed) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }

    /// Object-level check: the caller owns the resource, or holds a role
    /// that may act on anyone's.
    pub fn require_owner_or(&self, owner_id: i64, override_roles: &[Role]) -> Result<(), AppError> {
        if self.user_id == owner_id || authorize(self.role, override_roles) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to access this resource".to_string(),
            ))
        }
    }
}

fn identity_of(req: &Request<Body>) -> Result<Identity, AppError> {
    req.extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Not authenticated".to_string()))
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    identity_of(&req)?.require(permissions::MANAGE_USERS)?;
    Ok(next.run(req).await)
}

/// Axum Middleware: Teacher dashboard authorization (teachers and admins).
///
/// Must be used AFTER `auth_middleware`.
pub async fn teacher_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    identity_of(&req)?.require(permissions::TEACHER_DASHBOARD)?;
    Ok(next.run(req).await)
}
