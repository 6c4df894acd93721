use std::future::{ready, Ready};

use actix_web::{dev, web, FromRequest, HttpRequest};

use uuid::Uuid;

use crate::domain::Role;
use crate::error::{RestError, RestResult};

use super::{token_from_headers, SessionKeys};

/// Caller identity resolved from a verified session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: Role,
}

impl FromRequest for AuthenticatedUser {
    type Error = RestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> RestResult<AuthenticatedUser> {
    // NOTE: Must be registered with the application at startup
    let keys = req
        .app_data::<web::Data<SessionKeys>>()
        .ok_or_else(|| RestError::InternalError("Session keys not registered".into()))?;

    let token = token_from_headers(req.headers())
        .map_err(RestError::InvalidToken)?
        .ok_or(RestError::AccessDenied)?;

    let session = keys.verify(&token).map_err(|e| {
        tracing::warn!(error = %e, path = req.path(), "Rejected session token");
        RestError::InvalidToken(e)
    })?;

    Ok(AuthenticatedUser {
        id: session.user_id,
        role: session.role,
    })
}

/// Authenticate, then insist on `role`. A caller with any other role gets a 403
fn authorize(req: &HttpRequest, role: Role, denied: &str) -> RestResult<AuthenticatedUser> {
    let user = authenticate(req)?;
    if user.role != role {
        tracing::warn!(user_id = %user.id, role = %user.role, path = req.path(), "Route denied for role");
        return Err(RestError::Forbidden(denied.into()));
    }
    Ok(user)
}

/// Authenticated caller holding the admin role.
///
/// Authentication runs first, so a missing or bad token is still a 401; a
/// valid token without the role is a 403.
#[derive(Debug)]
pub struct Administrator(AuthenticatedUser);

impl Administrator {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl FromRequest for Administrator {
    type Error = RestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(authorize(req, Role::Admin, "Admin access required").map(Administrator))
    }
}

/// Authenticated caller holding the employee role. Admins cannot resign
#[derive(Debug)]
pub struct Employee(AuthenticatedUser);

impl Employee {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl FromRequest for Employee {
    type Error = RestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(authorize(req, Role::Employee, "Employee access required").map(Employee))
    }
}
