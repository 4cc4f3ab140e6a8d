//! In-memory implementation of the repository ports for service tests.
//! A transaction works on a copy of the state that only replaces the
//! shared state on commit. Unique keys are also checked against rows
//! committed by others after the transaction started.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::core::models::{
    choice::{Choice, Insert as ChoiceInsert},
    question::{Insert as QuestionInsert, Query as QuestionQuery, Question},
    upload_file::UploadedFileCreate,
    user::{Insert as UserInsert, Patch as UserPatch, User, DEFAULT_AVATAR},
    vote::{Insert as VoteInsert, Vote},
};
use crate::core::ports::hasher::Hasher;
use crate::core::ports::repository::{ChoiceCommon, Common, QuestionCommon, Store, TxStore, UserCommon, VoteCommon};
use crate::core::ports::uploader::Uploader;
use crate::error::Error;

#[derive(Debug, Clone, Default)]
pub struct State {
    pub users: Vec<User>,
    pub questions: Vec<Question>,
    pub choices: Vec<Choice>,
    pub votes: Vec<Vote>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn choice(&self, id: i32) -> &Choice {
        self.choices.iter().find(|c| c.id == id).expect("no such choice")
    }

    fn choice_mut(&mut self, id: i32) -> Result<&mut Choice, Error> {
        self.choices.iter_mut().find(|c| c.id == id).ok_or(Error::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    shared: Rc<RefCell<State>>,
    working: Option<State>,
    /// Vote ids the transaction started with.
    known_votes: Vec<i32>,
    choice_insert_budget: Rc<Cell<Option<usize>>>,
}

impl MemoryStore {
    pub fn conn(&self) -> MemoryStore {
        MemoryStore {
            shared: self.shared.clone(),
            working: None,
            known_votes: Vec::new(),
            choice_insert_budget: self.choice_insert_budget.clone(),
        }
    }

    pub fn tx(&self) -> MemoryStore {
        let state = self.shared.borrow().clone();
        MemoryStore {
            shared: self.shared.clone(),
            known_votes: state.votes.iter().map(|v| v.id).collect(),
            working: Some(state),
            choice_insert_budget: self.choice_insert_budget.clone(),
        }
    }

    pub fn snapshot(&self) -> State {
        self.shared.borrow().clone()
    }

    /// Makes every choice insert after the first `n` fail.
    pub fn fail_choice_inserts_after(&self, n: usize) {
        self.choice_insert_budget.set(Some(n));
    }

    fn username_committed_elsewhere(&self, username: &str, own_id: Option<i32>) -> bool {
        self.working.is_some() && self.shared.borrow().users.iter().any(|u| u.username == username && Some(u.id) != own_id)
    }

    fn vote_committed_elsewhere(&self, user_id: i32, question_id: i32) -> bool {
        self.working.is_some()
            && self
                .shared
                .borrow()
                .votes
                .iter()
                .any(|v| v.user_id == user_id && v.question_id == question_id && !self.known_votes.contains(&v.id))
    }

    fn with<R>(&mut self, f: impl FnOnce(&mut State) -> R) -> R {
        match &mut self.working {
            Some(state) => f(state),
            None => f(&mut self.shared.borrow_mut()),
        }
    }

    pub fn seed_user(&self, username: &str, is_superuser: bool) -> i32 {
        let mut state = self.shared.borrow_mut();
        let id = state.next_id();
        state.users.push(User {
            id,
            username: username.into(),
            email: format!("{}@example.com", username),
            password: String::new(),
            salt: String::new(),
            avatar: DEFAULT_AVATAR.into(),
            is_superuser,
            date_joined: Utc::now(),
        });
        id
    }

    pub fn seed_question(&self, text: &str, pub_date: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> i32 {
        let mut state = self.shared.borrow_mut();
        let id = state.next_id();
        state.questions.push(Question {
            id,
            question_text: text.into(),
            question_description: String::new(),
            picture: None,
            pub_date,
            expires_at,
        });
        id
    }

    pub fn seed_choice(&self, question_id: i32, text: &str) -> i32 {
        let mut state = self.shared.borrow_mut();
        let id = state.next_id();
        state.choices.push(Choice {
            id,
            question_id,
            choice_text: text.into(),
            votes: 0,
        });
        id
    }

    /// An open poll with two choices.
    pub fn seed_poll(&self, text: &str, first: &str, second: &str) -> (i32, i32, i32) {
        let now = Utc::now();
        let question = self.seed_question(text, now, Some(now + Duration::hours(12)));
        (question, self.seed_choice(question, first), self.seed_choice(question, second))
    }

    pub fn seed_vote(&self, user_id: i32, question_id: i32, choice_id: i32) {
        let mut state = self.shared.borrow_mut();
        let id = state.next_id();
        state.votes.push(Vote {
            id,
            user_id,
            question_id,
            choice_id,
        });
        if let Ok(choice) = state.choice_mut(choice_id) {
            choice.votes += 1;
        }
    }
}

impl UserCommon for MemoryStore {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        let elsewhere = self.username_committed_elsewhere(&user.username, None);
        self.with(|state| {
            if elsewhere || state.users.iter().any(|u| u.username == user.username) {
                return Err(Error::UniqueViolation("users_username_key".into()));
            }
            let id = state.next_id();
            state.users.push(User {
                id,
                username: user.username,
                email: user.email,
                password: user.password,
                salt: user.salt,
                avatar: user.avatar,
                is_superuser: false,
                date_joined: Utc::now(),
            });
            Ok(id)
        })
    }

    async fn get(&mut self, id: i32) -> Result<Option<User>, Error> {
        Ok(self.with(|state| state.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        Ok(self.with(|state| state.users.iter().find(|u| u.username == username).cloned()))
    }

    async fn exists_username(&mut self, username: &str, exclude_id: Option<i32>) -> Result<bool, Error> {
        Ok(self.with(|state| state.users.iter().any(|u| u.username == username && Some(u.id) != exclude_id)))
    }

    async fn patch(&mut self, id: i32, patch: UserPatch) -> Result<(), Error> {
        let elsewhere = patch.username.as_deref().map_or(false, |name| self.username_committed_elsewhere(name, Some(id)));
        self.with(|state| {
            let taken = patch.username.as_deref().map_or(false, |name| state.users.iter().any(|u| u.username == name && u.id != id));
            if elsewhere || taken {
                return Err(Error::UniqueViolation("users_username_key".into()));
            }
            let user = state.users.iter_mut().find(|u| u.id == id).ok_or(Error::NotFound)?;
            if let Some(username) = patch.username {
                user.username = username;
            }
            if let Some(email) = patch.email {
                user.email = email;
            }
            if let Some(avatar) = patch.avatar {
                user.avatar = avatar;
            }
            Ok(())
        })
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        self.with(|state| {
            state.users.retain(|u| u.id != id);
            state.votes.retain(|v| v.user_id != id);
        });
        Ok(())
    }
}

impl QuestionCommon for MemoryStore {
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error> {
        Ok(self.with(|state| {
            let id = state.next_id();
            state.questions.push(Question {
                id,
                question_text: question.question_text,
                question_description: question.question_description,
                picture: question.picture,
                pub_date: question.pub_date,
                expires_at: question.expires_at,
            });
            id
        }))
    }

    async fn query(&mut self, query: &QuestionQuery) -> Result<Vec<Question>, Error> {
        Ok(self.with(|state| {
            let mut questions: Vec<Question> = state
                .questions
                .iter()
                .filter(|q| query.id_eq.map_or(true, |id| q.id == id))
                .filter(|q| match (query.open_at, q.expires_at) {
                    (Some(now), Some(expires_at)) => expires_at > now,
                    _ => true,
                })
                .cloned()
                .collect();
            questions.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
            questions
        }))
    }

    async fn get(&mut self, query: &QuestionQuery) -> Result<Option<Question>, Error> {
        Ok(QuestionCommon::query(self, query).await?.into_iter().next())
    }
}

impl ChoiceCommon for MemoryStore {
    async fn insert(&mut self, choice: ChoiceInsert) -> Result<i32, Error> {
        if let Some(budget) = self.choice_insert_budget.get() {
            if budget == 0 {
                return Err(Error::DatabaseError(sqlx::Error::Protocol("choice insert failed".into())));
            }
            self.choice_insert_budget.set(Some(budget - 1));
        }
        Ok(self.with(|state| {
            let id = state.next_id();
            state.choices.push(Choice {
                id,
                question_id: choice.question_id,
                choice_text: choice.choice_text,
                votes: 0,
            });
            id
        }))
    }

    async fn query_by_question(&mut self, question_id: i32) -> Result<Vec<Choice>, Error> {
        Ok(self.with(|state| state.choices.iter().filter(|c| c.question_id == question_id).cloned().collect()))
    }

    async fn get(&mut self, question_id: i32, id: i32) -> Result<Option<Choice>, Error> {
        Ok(self.with(|state| state.choices.iter().find(|c| c.id == id && c.question_id == question_id).cloned()))
    }

    async fn increment(&mut self, id: i32) -> Result<(), Error> {
        self.with(|state| {
            state.choice_mut(id)?.votes += 1;
            Ok(())
        })
    }

    async fn decrement(&mut self, id: i32) -> Result<(), Error> {
        self.with(|state| {
            let choice = state.choice_mut(id)?;
            choice.votes = (choice.votes - 1).max(0);
            Ok(())
        })
    }

    async fn decrement_for_user(&mut self, user_id: i32) -> Result<(), Error> {
        self.with(|state| {
            let voted: Vec<i32> = state.votes.iter().filter(|v| v.user_id == user_id).map(|v| v.choice_id).collect();
            for id in voted {
                let choice = state.choice_mut(id)?;
                choice.votes = (choice.votes - 1).max(0);
            }
            Ok(())
        })
    }
}

impl VoteCommon for MemoryStore {
    async fn insert(&mut self, vote: VoteInsert) -> Result<i32, Error> {
        let elsewhere = self.vote_committed_elsewhere(vote.user_id, vote.question_id);
        self.with(|state| {
            if elsewhere || state.votes.iter().any(|v| v.user_id == vote.user_id && v.question_id == vote.question_id) {
                return Err(Error::UniqueViolation("votes_user_id_question_id_key".into()));
            }
            let id = state.next_id();
            state.votes.push(Vote {
                id,
                user_id: vote.user_id,
                question_id: vote.question_id,
                choice_id: vote.choice_id,
            });
            Ok(id)
        })
    }

    async fn get(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error> {
        Ok(self.with(|state| state.votes.iter().find(|v| v.user_id == user_id && v.question_id == question_id).cloned()))
    }

    async fn get_for_update(&mut self, user_id: i32, question_id: i32) -> Result<Option<Vote>, Error> {
        VoteCommon::get(self, user_id, question_id).await
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        self.with(|state| state.votes.retain(|v| v.id != id));
        Ok(())
    }
}

impl Common for MemoryStore {}
impl Store for MemoryStore {}

impl TxStore for MemoryStore {
    async fn commit(self) -> Result<(), Error> {
        if let Some(state) = self.working {
            *self.shared.borrow_mut() = state;
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUploader {
    files: RefCell<Vec<String>>,
}

impl MemoryUploader {
    pub fn paths(&self) -> Vec<String> {
        self.files.borrow().clone()
    }
}

impl Uploader for MemoryUploader {
    async fn put(&self, file: UploadedFileCreate) -> Result<String, Error> {
        let path = format!("{}/{}.{}", file.category.dir(), Uuid::new_v4(), file.extension);
        self.files.borrow_mut().push(path.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        self.files.borrow_mut().retain(|p| p != path);
        Ok(())
    }
}

/// Reversible stand-in for the SHA-256 hasher.
pub struct PlainHasher;

impl Hasher for PlainHasher {
    fn gen_salt(&self) -> String {
        "salt".into()
    }

    fn hash_password(&self, password: &str, salt: &str) -> String {
        format!("{}${}", salt, password)
    }
}
