pub mod auth;
pub mod poll;
pub mod profile;
pub mod vote;

use actix_web::cookie::{time::OffsetDateTime, Cookie, CookieBuilder};
use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;

use crate::config::Config;
use crate::core::ports::tokener::Tokener;
use crate::error::Error;
use crate::impls::tokener::jwt::{Claim, JWT};
use crate::middlewares::jwt::JWT_TOKEN;

fn session_cookie(token: String) -> Cookie<'static> {
    CookieBuilder::new(JWT_TOKEN, token).path("/").http_only(true).finish()
}

/// Issues a session for `uid` and sends the browser on to `location`.
pub(crate) fn signed_in(jwt: &JWT, config: &Config, uid: i32, location: &str) -> Result<HttpResponse, Error> {
    let token = jwt.gen_token(&Claim::new(uid, config.token_lifetime))?;
    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .cookie(session_cookie(token))
        .finish())
}

pub(crate) fn signed_out(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .cookie(CookieBuilder::new(JWT_TOKEN, "").path("/").http_only(true).expires(OffsetDateTime::now_utc()).finish())
        .finish()
}
