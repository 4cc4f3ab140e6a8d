use crate::core::models::user::{Insert as UserInsert, Patch as UserPatch, ProfileUpdate, Registration, User, DEFAULT_AVATAR};
use crate::core::ports::hasher::Hasher;
use crate::core::ports::repository::{ChoiceCommon, Store, TxStore, UserCommon};
use crate::core::ports::uploader::Uploader;
use crate::error::Error;
use crate::forms::FieldErrors;

pub static USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Resolves the session identity to a live user. A token that outlived
/// its account is treated as no session at all.
pub async fn viewer<S>(store: &mut S, uid: i32) -> Result<User, Error>
where
    S: Store,
{
    UserCommon::get(store, uid).await?.ok_or(Error::Unauthorized)
}

fn username_taken() -> Error {
    let mut errors = FieldErrors::default();
    errors.add("username", USERNAME_TAKEN);
    Error::Validation(errors)
}

async fn discard_upload<U: Uploader>(uploader: &U, path: Option<String>) {
    if let Some(path) = path {
        if let Err(e) = uploader.delete(&path).await {
            log::warn!("failed to remove orphaned upload {}: {}", path, e);
        }
    }
}

pub async fn register<S, H, U>(mut store: S, hasher: &H, uploader: &U, registration: Registration) -> Result<i32, Error>
where
    S: TxStore,
    H: Hasher,
    U: Uploader,
{
    if UserCommon::exists_username(&mut store, &registration.username, None).await? {
        return Err(username_taken());
    }
    let avatar = match registration.avatar {
        Some(file) => Some(uploader.put(file).await?),
        None => None,
    };
    let salt = hasher.gen_salt();
    let insert = UserInsert {
        password: hasher.hash_password(&registration.password, &salt),
        salt,
        username: registration.username,
        email: registration.email,
        avatar: avatar.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_owned()),
    };
    let res = async {
        let id = UserCommon::insert(&mut store, insert).await?;
        store.commit().await?;
        Ok::<_, Error>(id)
    }
    .await;
    match res {
        Ok(id) => {
            log::info!("user {} registered", id);
            Ok(id)
        }
        Err(e) => {
            discard_upload(uploader, avatar).await;
            if e.is_unique_violation() {
                return Err(username_taken());
            }
            Err(e)
        }
    }
}

/// Returns the user when the credentials match.
pub async fn authenticate<S, H>(store: &mut S, hasher: &H, username: &str, password: &str) -> Result<Option<User>, Error>
where
    S: Store,
    H: Hasher,
{
    match UserCommon::get_by_username(store, username).await? {
        Some(user) if hasher.verify_password(password, &user.salt, &user.password) => Ok(Some(user)),
        _ => Ok(None),
    }
}

pub async fn update_profile<S, U>(mut store: S, uploader: &U, uid: i32, update: ProfileUpdate) -> Result<(), Error>
where
    S: TxStore,
    U: Uploader,
{
    viewer(&mut store, uid).await?;
    if UserCommon::exists_username(&mut store, &update.username, Some(uid)).await? {
        return Err(username_taken());
    }
    let avatar = match update.avatar {
        Some(file) => Some(uploader.put(file).await?),
        None => None,
    };
    let patch = UserPatch {
        username: Some(update.username),
        email: Some(update.email),
        avatar: avatar.clone(),
    };
    let res = async {
        UserCommon::patch(&mut store, uid, patch).await?;
        store.commit().await?;
        Ok::<_, Error>(())
    }
    .await;
    if let Err(e) = res {
        discard_upload(uploader, avatar).await;
        if e.is_unique_violation() {
            return Err(username_taken());
        }
        return Err(e);
    }
    Ok(())
}

/// Deletes the account and its votes, taking the votes back out of the
/// choice counters first so tallies keep matching the vote rows.
pub async fn delete_account<S>(mut store: S, uid: i32) -> Result<(), Error>
where
    S: TxStore,
{
    viewer(&mut store, uid).await?;
    ChoiceCommon::decrement_for_user(&mut store, uid).await?;
    UserCommon::delete(&mut store, uid).await?;
    store.commit().await?;
    log::info!("user {} deleted their account", uid);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::upload_file::{Category, UploadedFileCreate};
    use crate::core::services::memory::{MemoryStore, MemoryUploader, PlainHasher};
    use crate::core::services::vote::cast_vote;

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.into(),
            email: format!("{}@example.com", username),
            password: "correct horse".into(),
            avatar: None,
        }
    }

    fn avatar() -> UploadedFileCreate {
        UploadedFileCreate {
            category: Category::Avatar,
            extension: "png".into(),
            content: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        let id = register(db.tx(), &PlainHasher, &uploader, registration("alice")).await.unwrap();
        let user = viewer(&mut db.conn(), id).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.avatar, DEFAULT_AVATAR);
        assert_ne!(user.password, "correct horse");
        assert!(!user.is_superuser);

        let found = authenticate(&mut db.conn(), &PlainHasher, "alice", "correct horse").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(id));
        assert!(authenticate(&mut db.conn(), &PlainHasher, "alice", "wrong").await.unwrap().is_none());
        assert!(authenticate(&mut db.conn(), &PlainHasher, "bob", "correct horse").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_stores_avatar() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        let mut form = registration("alice");
        form.avatar = Some(avatar());
        let id = register(db.tx(), &PlainHasher, &uploader, form).await.unwrap();
        let user = viewer(&mut db.conn(), id).await.unwrap();
        assert!(user.avatar.starts_with("avatar/"));
        assert_eq!(uploader.paths(), vec![user.avatar]);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        register(db.tx(), &PlainHasher, &uploader, registration("alice")).await.unwrap();
        let mut form = registration("alice");
        form.avatar = Some(avatar());
        match register(db.tx(), &PlainHasher, &uploader, form).await {
            Err(Error::Validation(errors)) => assert_eq!(errors.get("username"), Some(&vec![USERNAME_TAKEN.to_owned()])),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(db.snapshot().users.len(), 1);
        assert!(uploader.paths().is_empty());
    }

    #[tokio::test]
    async fn test_register_loses_race_for_username() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        let tx = db.tx();
        db.seed_user("alice", false);
        let mut form = registration("alice");
        form.avatar = Some(avatar());
        match register(tx, &PlainHasher, &uploader, form).await {
            Err(Error::Validation(errors)) => assert_eq!(errors.get("username"), Some(&vec![USERNAME_TAKEN.to_owned()])),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(db.snapshot().users.len(), 1);
        assert!(uploader.paths().is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_loses_race_for_username() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        let alice = register(db.tx(), &PlainHasher, &uploader, registration("alice")).await.unwrap();
        let tx = db.tx();
        db.seed_user("bob", false);
        let update = ProfileUpdate {
            username: "bob".into(),
            email: "".into(),
            avatar: Some(avatar()),
        };
        match update_profile(tx, &uploader, alice, update).await {
            Err(Error::Validation(errors)) => assert_eq!(errors.get("username"), Some(&vec![USERNAME_TAKEN.to_owned()])),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(viewer(&mut db.conn(), alice).await.unwrap().username, "alice");
        assert!(uploader.paths().is_empty());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        let alice = register(db.tx(), &PlainHasher, &uploader, registration("alice")).await.unwrap();
        register(db.tx(), &PlainHasher, &uploader, registration("bob")).await.unwrap();

        let update = ProfileUpdate {
            username: "bob".into(),
            email: "".into(),
            avatar: None,
        };
        assert!(matches!(update_profile(db.tx(), &uploader, alice, update).await, Err(Error::Validation(_))));

        let update = ProfileUpdate {
            username: "alice2".into(),
            email: "".into(),
            avatar: Some(avatar()),
        };
        update_profile(db.tx(), &uploader, alice, update).await.unwrap();
        let user = viewer(&mut db.conn(), alice).await.unwrap();
        assert_eq!(user.username, "alice2");
        assert_eq!(user.email, "");
        assert!(user.avatar.starts_with("avatar/"));
    }

    #[tokio::test]
    async fn test_keep_own_username() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        let alice = register(db.tx(), &PlainHasher, &uploader, registration("alice")).await.unwrap();
        let update = ProfileUpdate {
            username: "alice".into(),
            email: "new@example.com".into(),
            avatar: None,
        };
        update_profile(db.tx(), &uploader, alice, update).await.unwrap();
        let user = viewer(&mut db.conn(), alice).await.unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.avatar, DEFAULT_AVATAR);
    }

    #[tokio::test]
    async fn test_delete_account_takes_back_votes() {
        let db = MemoryStore::default();
        let uploader = MemoryUploader::default();
        let alice = register(db.tx(), &PlainHasher, &uploader, registration("alice")).await.unwrap();
        let bob = register(db.tx(), &PlainHasher, &uploader, registration("bob")).await.unwrap();
        let (question, red, _) = db.seed_poll("Color?", "Red", "Blue");
        cast_vote(db.tx(), alice, question, Some(red), chrono::Utc::now()).await.unwrap();
        cast_vote(db.tx(), bob, question, Some(red), chrono::Utc::now()).await.unwrap();

        delete_account(db.tx(), alice).await.unwrap();

        let state = db.snapshot();
        assert!(state.users.iter().all(|u| u.id != alice));
        assert_eq!(state.votes.len(), 1);
        assert_eq!(state.choice(red).votes, 1);
        assert!(matches!(viewer(&mut db.conn(), alice).await, Err(Error::Unauthorized)));
    }
}
