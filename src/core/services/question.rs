use chrono::{DateTime, Duration, Utc};

use crate::core::models::{
    choice::{tally, Insert as ChoiceInsert},
    question::{Create as QuestionCreate, Detail, Insert as QuestionInsert, Item, Query as QuestionQuery, Question, Results},
    user::User,
};
use crate::core::ports::repository::{ChoiceCommon, QuestionCommon, Store, TxStore, VoteCommon};
use crate::core::ports::uploader::Uploader;
use crate::core::services::user::viewer;
use crate::error::Error;

/// Superusers see every poll, everybody else only the open ones.
pub fn visibility(user: &User, now: DateTime<Utc>) -> QuestionQuery {
    QuestionQuery {
        open_at: if user.is_superuser { None } else { Some(now) },
        ..default::default()
    }
}

pub(crate) async fn visible_question<S>(store: &mut S, user: &User, id: i32, now: DateTime<Utc>) -> Result<Question, Error>
where
    S: Store,
{
    let query = QuestionQuery {
        id_eq: Some(id),
        ..visibility(user, now)
    };
    QuestionCommon::get(store, &query).await?.ok_or(Error::NotFound)
}

pub async fn create_poll<S, U>(mut store: S, uploader: &U, poll: QuestionCreate, now: DateTime<Utc>, lifetime: Duration) -> Result<i32, Error>
where
    S: TxStore,
    U: Uploader,
{
    if poll.choices.is_empty() {
        return Err(Error::BusinessError("a poll needs at least one choice".into()));
    }
    let picture = match poll.picture {
        Some(file) => Some(uploader.put(file).await?),
        None => None,
    };
    let insert = QuestionInsert {
        question_text: poll.question_text,
        question_description: poll.question_description,
        picture: picture.clone(),
        pub_date: now,
        expires_at: Some(now + lifetime),
    };
    let choices = poll.choices;
    let res = async {
        let question_id = QuestionCommon::insert(&mut store, insert).await?;
        for choice_text in choices {
            ChoiceCommon::insert(&mut store, ChoiceInsert { question_id, choice_text }).await?;
        }
        store.commit().await?;
        Ok::<_, Error>(question_id)
    }
    .await;
    match res {
        Ok(id) => {
            log::info!("poll {} created", id);
            Ok(id)
        }
        Err(e) => {
            if let Some(path) = picture {
                if let Err(e) = uploader.delete(&path).await {
                    log::warn!("failed to remove orphaned picture {}: {}", path, e);
                }
            }
            Err(e)
        }
    }
}

/// The viewer together with the polls they may see, newest first.
pub async fn list_polls<S>(store: &mut S, uid: i32, now: DateTime<Utc>) -> Result<(User, Vec<Item>), Error>
where
    S: Store,
{
    let user = viewer(store, uid).await?;
    let questions = QuestionCommon::query(store, &visibility(&user, now)).await?;
    Ok((user, questions.into_iter().map(|q| Item::new(q, now)).collect()))
}

pub enum PollDetail {
    Ballot(Detail),
    AlreadyVoted,
}

pub async fn poll_detail<S>(store: &mut S, uid: i32, id: i32, now: DateTime<Utc>) -> Result<PollDetail, Error>
where
    S: Store,
{
    let user = viewer(store, uid).await?;
    let question = visible_question(store, &user, id, now).await?;
    if VoteCommon::get(store, user.id, question.id).await?.is_some() {
        return Ok(PollDetail::AlreadyVoted);
    }
    let choices = ChoiceCommon::query_by_question(store, question.id).await?;
    Ok(PollDetail::Ballot(Detail { question, choices }))
}

pub async fn results<S>(store: &mut S, uid: i32, id: i32) -> Result<Results, Error>
where
    S: Store,
{
    let user = viewer(store, uid).await?;
    let question = QuestionCommon::get(
        store,
        &QuestionQuery {
            id_eq: Some(id),
            ..default::default()
        },
    )
    .await?
    .ok_or(Error::NotFound)?;
    let (choices_with_percent, total_votes) = tally(ChoiceCommon::query_by_question(store, question.id).await?);
    let user_choice_id = VoteCommon::get(store, user.id, question.id).await?.map(|v| v.choice_id);
    Ok(Results {
        question,
        choices_with_percent,
        user_choice_id,
        total_votes,
    })
}
