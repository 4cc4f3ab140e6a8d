use crate::core::models::{
    choice::{Choice, Insert as ChoiceInsert},
    question::{Insert as QuestionInsert, Query as QuestionQuery, Question},
    user::{Insert as UserInsert, Patch as UserPatch, User},
    vote::{Insert as VoteInsert, Vote},
};
use crate::error::Error;

pub trait UserCommon {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<User>, Error>;
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error>;
    async fn exists_username(&mut self, username: &str, exclude_id: Option<i32>) -> Result<bool, Error>;
    async fn patch(&mut self, id: i32, patch: UserPatch) -> Result<(), Error>;
    async fn delete(&mut self, id: i32) -> Result<(), Error>;
}

pub trait QuestionCommon {
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error>;
    /// Newest first.
    async fn query(&mut self, query: &QuestionQuery) -> Result<Vec<Question>, Error>;
    async fn get(&mut self, query: &QuestionQuery) -> Result<Option<Question>, Error>;
}

pub trait ChoiceCommon {
    async fn insert(&mut self, choice: ChoiceInsert) -> Result<i32, Error>;
    async fn query_by_question(&mut self, question_id: i32) -> Result<Vec<Choice>, Error>;
    async fn get(&mut self, question_id: i32, id: i32) -> Result<Option<Choice>, Error>;
    async fn increment(&mut self, id: i32) -> Result<(), Error>;
    async fn decrement(&mut self, id: i32) -> Result<(), Error>;
    /// Takes back every vote the user has cast.
    async fn decrement_for_user(&mut self, user_id: i32) -> Result<(), Error>;
}

pub trait VoteCommon {
    async fn insert(&mut self, vote: VoteInsert) -> Result<i32, Error>;
    async fn get(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error>;
    async fn get_for_update(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error>;
    async fn delete(&mut self, id: i32) -> Result<(), Error>;
}

pub trait Common: UserCommon + QuestionCommon + ChoiceCommon + VoteCommon {}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}
