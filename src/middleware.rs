use crate::auth::validate_jwt;
use crate::config::Config;
use crate::errors::ApiError;
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Payload, ServiceRequest, ServiceResponse},
    error::ResponseError,
    http::header,
    middleware::Next,
    web, Error as AWError, FromRequest, HttpMessage, HttpRequest,
};
use std::future::{ready, Ready};

/// Identity extracted from a verified bearer token, inserted into request
/// extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: i64,
    pub email: String,
}

impl FromRequest for AuthedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthedUser>()
                .cloned()
                .ok_or(ApiError::TokenMissing),
        )
    }
}

/// Request gate for protected routes: `unauthenticated -> authorized` only
/// when a well-formed, verifiable bearer token is present. Any failure
/// short-circuits into the envelope before route logic runs.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, AWError> {
    let outcome = (|| {
        let header_value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::TokenMissing)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .filter(|rest| !rest.is_empty())
            .ok_or(ApiError::TokenMissing)?;

        let config = req
            .app_data::<web::Data<Config>>()
            .ok_or(ApiError::Internal)?;
        let claims = validate_jwt(token, config.jwt_secret.as_bytes())?;

        Ok::<_, ApiError>(AuthedUser {
            user_id: claims.sub,
            email: claims.email,
        })
    })();

    match outcome {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req)
                .await
                .map(ServiceResponse::map_into_boxed_body)
        }
        Err(err) => {
            let response = err.error_response();
            Ok(req.into_response(response))
        }
    }
}
