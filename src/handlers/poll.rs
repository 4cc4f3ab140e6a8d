use actix_multipart::Multipart;
use actix_web::web::{Data, Path};
use actix_web::HttpResponse;
use chrono::Utc;
use serde::Serialize;

use crate::config::Config;
use crate::context::UserInfo;
use crate::core::models::question::{Detail, Item};
use crate::core::models::user::Profile;
use crate::core::services::question::{self, PollDetail};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::forms::poll::{self, Values};
use crate::forms::FieldErrors;
use crate::impls::uploaders::local_storage::LocalStorage;
use crate::request::read_form;
use crate::response::{page, redirect};

#[derive(Debug, Serialize)]
struct IndexPage {
    user: Profile,
    latest_question_list: Vec<Item>,
}

pub async fn index(user_info: UserInfo, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut conn = db.acquire().await?;
    let (user, latest_question_list) = question::list_polls(&mut conn, user_info.id, Utc::now()).await?;
    Ok(page(&IndexPage {
        user: user.into(),
        latest_question_list,
    }))
}

#[derive(Debug, Serialize)]
struct PollFormPage {
    form: Values,
    errors: FieldErrors,
}

pub async fn create_poll_page(_: UserInfo, config: Data<Config>) -> HttpResponse {
    page(&PollFormPage {
        form: Values::blank(&config.poll_form),
        errors: FieldErrors::default(),
    })
}

pub async fn create_poll(user_info: UserInfo, payload: Multipart, db: Data<PgSqlxManager>, uploader: Data<LocalStorage>, config: Data<Config>) -> Result<HttpResponse, Error> {
    let data = read_form(payload).await?;
    let poll = match poll::validate(&data, &config.poll_form) {
        Ok(poll) => poll,
        Err(errors) => {
            return Ok(page(&PollFormPage {
                form: Values::from_form(&data, &config.poll_form),
                errors,
            }))
        }
    };
    let id = question::create_poll(db.begin().await?, uploader.get_ref(), poll, Utc::now(), config.poll_lifetime).await?;
    log::debug!("user {} created poll {}", user_info.id, id);
    Ok(redirect("/"))
}

/// Ballot page, also used to re-show the ballot after an empty vote.
#[derive(Debug, Serialize)]
pub(crate) struct DetailPage {
    #[serde(flatten)]
    pub detail: Detail,
    pub error_message: Option<&'static str>,
}

pub(crate) fn results_url(id: i32) -> String {
    format!("/{}/results/", id)
}

pub async fn detail(user_info: UserInfo, id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let (id,) = id.into_inner();
    let mut conn = db.acquire().await?;
    match question::poll_detail(&mut conn, user_info.id, id, Utc::now()).await? {
        PollDetail::Ballot(detail) => Ok(page(&DetailPage { detail, error_message: None })),
        PollDetail::AlreadyVoted => Ok(redirect(&results_url(id))),
    }
}

pub async fn results(user_info: UserInfo, id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let (id,) = id.into_inner();
    let mut conn = db.acquire().await?;
    let results = question::results(&mut conn, user_info.id, id).await?;
    Ok(page(&results))
}
