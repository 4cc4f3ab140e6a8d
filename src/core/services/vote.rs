use chrono::{DateTime, Utc};

use crate::core::models::question::Detail;
use crate::core::models::vote::Insert as VoteInsert;
use crate::core::ports::repository::{ChoiceCommon, TxStore, VoteCommon};
use crate::core::services::question::visible_question;
use crate::core::services::user::viewer;
use crate::error::Error;

#[derive(Debug)]
pub enum Cast {
    Recorded,
    /// The ballot repeated the choice already on record.
    Unchanged,
    /// No usable choice was submitted; carries the ballot to show again.
    NoChoice(Detail),
}

/// Records the user's ballot, replacing any earlier one for the same
/// question. Both counters and the vote row change in one transaction.
pub async fn cast_vote<S>(mut store: S, uid: i32, question_id: i32, choice_id: Option<i32>, now: DateTime<Utc>) -> Result<Cast, Error>
where
    S: TxStore,
{
    let user = viewer(&mut store, uid).await?;
    let question = visible_question(&mut store, &user, question_id, now).await?;
    let choice = match choice_id {
        Some(id) => ChoiceCommon::get(&mut store, question.id, id).await?,
        None => None,
    };
    let Some(choice) = choice else {
        let choices = ChoiceCommon::query_by_question(&mut store, question.id).await?;
        store.rollback().await?;
        return Ok(Cast::NoChoice(Detail { question, choices }));
    };
    if let Some(previous) = VoteCommon::get_for_update(&mut store, user.id, question.id).await? {
        if previous.choice_id == choice.id {
            store.rollback().await?;
            return Ok(Cast::Unchanged);
        }
        ChoiceCommon::decrement(&mut store, previous.choice_id).await?;
        VoteCommon::delete(&mut store, previous.id).await?;
    }
    ChoiceCommon::increment(&mut store, choice.id).await?;
    let inserted = VoteCommon::insert(
        &mut store,
        VoteInsert {
            user_id: user.id,
            question_id: question.id,
            choice_id: choice.id,
        },
    )
    .await;
    match inserted {
        Ok(_) => {}
        Err(e) if e.is_unique_violation() => {
            store.rollback().await?;
            return Err(Error::Conflict("another ballot for this poll is being recorded".into()));
        }
        Err(e) => return Err(e),
    }
    store.commit().await?;
    log::debug!("user {} voted for choice {} on poll {}", user.id, choice.id, question.id);
    Ok(Cast::Recorded)
}
