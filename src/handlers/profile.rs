use actix_multipart::Multipart;
use actix_web::web::Data;
use actix_web::HttpResponse;
use serde::Serialize;

use super::signed_out;
use crate::context::UserInfo;
use crate::core::models::user::Profile;
use crate::core::services::user::{self, viewer};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::forms::profile::{self, Submission, Values};
use crate::forms::{FieldErrors, FormData};
use crate::impls::uploaders::local_storage::LocalStorage;
use crate::request::read_form;
use crate::response::{page, redirect};

#[derive(Debug, Serialize)]
struct ProfilePage {
    user: Profile,
    form: Values,
    errors: FieldErrors,
}

pub async fn profile(user_info: UserInfo, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut conn = db.acquire().await?;
    let user = Profile::from(viewer(&mut conn, user_info.id).await?);
    Ok(page(&ProfilePage {
        form: user.clone().into(),
        user,
        errors: FieldErrors::default(),
    }))
}

async fn rerender(db: &PgSqlxManager, uid: i32, data: &FormData, errors: FieldErrors) -> Result<HttpResponse, Error> {
    let mut conn = db.acquire().await?;
    let user = Profile::from(viewer(&mut conn, uid).await?);
    Ok(page(&ProfilePage {
        form: Values::from_form(data, &user),
        user,
        errors,
    }))
}

pub async fn update_profile(user_info: UserInfo, payload: Multipart, db: Data<PgSqlxManager>, uploader: Data<LocalStorage>) -> Result<HttpResponse, Error> {
    let data = read_form(payload).await?;
    match profile::validate(&data) {
        Ok(Submission::DeleteAccount) => {
            user::delete_account(db.begin().await?, user_info.id).await?;
            Ok(signed_out("/"))
        }
        Ok(Submission::Update(update)) => match user::update_profile(db.begin().await?, uploader.get_ref(), user_info.id, update).await {
            Ok(()) => Ok(redirect("/")),
            Err(Error::Validation(errors)) => rerender(&db, user_info.id, &data, errors).await,
            Err(e) => Err(e),
        },
        Err(errors) => rerender(&db, user_info.id, &data, errors).await,
    }
}
