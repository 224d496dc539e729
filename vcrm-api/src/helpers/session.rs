use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use shared_types::{ErrorResponse, User};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::database::users as db;
use crate::database::Database;

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    NotApproved,
    AdminOnly,
    Internal(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::InvalidToken => write!(f, "Invalid or expired session"),
            AuthError::NotApproved => write!(f, "Account is waiting for admin approval"),
            AuthError::AdminOnly => write!(f, "Admin access required"),
            AuthError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => {
                HttpResponse::Unauthorized().json(body)
            }
            AuthError::NotApproved | AuthError::AdminOnly => HttpResponse::Forbidden().json(body),
            AuthError::Internal(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

/// The signed-in user for one request, resolved from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.user.is_admin {
            Ok(())
        } else {
            Err(AuthError::AdminOnly)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequest for Session {
    type Error = AuthError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let database = req.app_data::<web::Data<Arc<Database>>>().cloned();

        Box::pin(async move {
            let token = token.ok_or(AuthError::MissingToken)?;
            let database = database
                .ok_or_else(|| AuthError::Internal("Database is not configured".to_string()))?;

            let user = db::find_session_user(database.async_connection.clone(), &token)
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?
                .ok_or(AuthError::InvalidToken)?;

            if !user.is_approved {
                return Err(AuthError::NotApproved);
            }

            Ok(Session { token, user })
        })
    }
}
