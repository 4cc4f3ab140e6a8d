use actix_web::web::{Data, Form, Path};
use actix_web::HttpResponse;
use chrono::Utc;
use serde::Deserialize;

use super::poll::{results_url, DetailPage};
use crate::context::UserInfo;
use crate::core::models::question::Detail;
use crate::core::models::vote::NO_CHOICE_MESSAGE;
use crate::core::services::vote::{cast_vote, Cast};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::response::{page, redirect};

#[derive(Debug, Deserialize)]
pub struct Ballot {
    choice: Option<String>,
}

impl Ballot {
    fn choice_id(&self) -> Option<i32> {
        self.choice.as_deref().and_then(|c| c.trim().parse().ok())
    }
}

pub async fn vote(user_info: UserInfo, id: Path<(i32,)>, Form(ballot): Form<Ballot>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let (id,) = id.into_inner();
    match cast_vote(db.begin().await?, user_info.id, id, ballot.choice_id(), Utc::now()).await? {
        Cast::Recorded | Cast::Unchanged => Ok(redirect(&results_url(id))),
        Cast::NoChoice(detail) => Ok(ballot_again(detail)),
    }
}

fn ballot_again(detail: Detail) -> HttpResponse {
    page(&DetailPage {
        detail,
        error_message: Some(NO_CHOICE_MESSAGE),
    })
}
