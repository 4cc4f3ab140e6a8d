use actix_multipart::Multipart;
use actix_web::web::{Data, Form, Query};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use super::{signed_in, signed_out};
use crate::config::Config;
use crate::core::services::user;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::forms::login::{safe_next, Login, Values as LoginValues, INVALID_LOGIN};
use crate::forms::registration::{self, Values as RegistrationValues};
use crate::forms::{FieldErrors, NON_FIELD_ERRORS};
use crate::impls::hasher::sha256::Sha256Hasher;
use crate::impls::tokener::jwt::JWT;
use crate::impls::uploaders::local_storage::LocalStorage;
use crate::request::read_form;
use crate::response::page;
use crate::routes::LOGIN_URL;

#[derive(Debug, Serialize)]
struct RegistrationPage {
    form: RegistrationValues,
    errors: FieldErrors,
}

pub async fn registration_page() -> HttpResponse {
    page(&RegistrationPage {
        form: RegistrationValues::default(),
        errors: FieldErrors::default(),
    })
}

pub async fn register(
    payload: Multipart,
    db: Data<PgSqlxManager>,
    hasher: Data<Sha256Hasher>,
    uploader: Data<LocalStorage>,
    jwt: Data<JWT>,
    config: Data<Config>,
) -> Result<HttpResponse, Error> {
    let data = read_form(payload).await?;
    let rerender = |errors| {
        page(&RegistrationPage {
            form: RegistrationValues::from_form(&data),
            errors,
        })
    };
    let registration = match registration::validate(&data) {
        Ok(registration) => registration,
        Err(errors) => return Ok(rerender(errors)),
    };
    let tx = db.begin().await?;
    match user::register(tx, hasher.get_ref(), uploader.get_ref(), registration).await {
        Ok(uid) => signed_in(&jwt, &config, uid, "/"),
        Err(Error::Validation(errors)) => Ok(rerender(errors)),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Serialize)]
struct LoginPage {
    form: LoginValues,
    errors: FieldErrors,
}

#[derive(Debug, Deserialize)]
pub struct Next {
    next: Option<String>,
}

pub async fn login_page(Query(Next { next }): Query<Next>) -> HttpResponse {
    page(&LoginPage {
        form: LoginValues {
            next,
            ..Default::default()
        },
        errors: FieldErrors::default(),
    })
}

pub async fn login(Form(form): Form<Login>, db: Data<PgSqlxManager>, hasher: Data<Sha256Hasher>, jwt: Data<JWT>, config: Data<Config>) -> Result<HttpResponse, Error> {
    let mut conn = db.acquire().await?;
    if let Some(user) = user::authenticate(&mut conn, hasher.get_ref(), &form.username, &form.password).await? {
        log::info!("user {} logged in", user.id);
        return signed_in(&jwt, &config, user.id, safe_next(form.next.as_deref()));
    }
    let mut errors = FieldErrors::default();
    errors.add(NON_FIELD_ERRORS, INVALID_LOGIN);
    Ok(page(&LoginPage {
        form: LoginValues {
            username: form.username,
            next: form.next,
        },
        errors,
    }))
}

pub async fn logout() -> HttpResponse {
    signed_out(LOGIN_URL)
}
