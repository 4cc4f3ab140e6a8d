use std::future::{ready, Future, Ready};
use std::pin::Pin;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};

use crate::context::UserInfo;
use crate::core::ports::tokener::Tokener;
use crate::impls::tokener::jwt::{Claim, JWT};
use crate::response::redirect;
use crate::routes::LOGIN_URL;

pub static JWT_TOKEN: &str = "JWT_TOKEN";

/// Puts the session user into the request extensions. Requests without a
/// valid session cookie are sent to the login page with `next` set to the
/// path they asked for.
pub struct JWTMiddleware {
    secret: Vec<u8>,
}

impl JWTMiddleware {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JWTMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JWTService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JWTService {
            tokener: JWT::new(self.secret.clone()),
            next_service: service,
        }))
    }
}

pub struct JWTService<S> {
    tokener: JWT,
    next_service: S,
}

/// Login page URL with the requested path and query as `next`.
fn login_location(req: &ServiceRequest) -> String {
    let next = req.uri().path_and_query().map_or(req.path(), |pq| pq.as_str());
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{}?{}", LOGIN_URL, query),
        Err(_) => LOGIN_URL.to_owned(),
    }
}

impl<S> JWTService<S> {
    fn session(&self, req: &ServiceRequest) -> Option<i32> {
        let cookie = req.cookie(JWT_TOKEN)?;
        match <JWT as Tokener<Claim>>::verify_token(&self.tokener, cookie.value()) {
            Ok(claim) => claim.uid(),
            Err(e) => {
                log::debug!("rejected session token: {}", e);
                None
            }
        }
    }
}

impl<S, B> Service<ServiceRequest> for JWTService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut core::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(id) = self.session(&req) else {
            let location = login_location(&req);
            let (req, _) = req.into_parts();
            let resp = ServiceResponse::new(req, redirect(&location)).map_into_right_body();
            return Box::pin(async move { Ok(resp) });
        };
        req.extensions_mut().insert(UserInfo { id });
        let res_fut = self.next_service.call(req);
        Box::pin(async move {
            let resp = res_fut.await?;
            Ok(resp.map_into_left_body())
        })
    }
}
