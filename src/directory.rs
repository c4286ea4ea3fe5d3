//! The user directory service.
//!
//! See [`UserDirectory`].

use derive_more::{Display, Error, From};

use sqlx::SqlitePool;

use tracing::instrument;

use user_directory_model::{LoginUser, User, request::user::UserRequest};

use uuid::Uuid;

use crate::store::{self, UserFilter};

/// An error from a directory operation.
#[derive(Debug, Display, Error, From)]
pub enum DirectoryError {
    /// No user has the id.
    #[display("user not found")]
    #[from(ignore)]
    NotFound,
    /// There are no users at all.
    #[display("empty")]
    #[from(ignore)]
    Empty,
    /// The name is already taken by another user.
    #[display("username already exists")]
    #[from(ignore)]
    Conflict,
    /// No user has the name and password.
    #[display("invalid login")]
    #[from(ignore)]
    InvalidCredentials,
    /// The record store could not be reached or failed.
    #[display("record store failure: {_0}")]
    Store(sqlx::Error),
}

/// Stateless facade over the record store.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone, Debug)]
pub struct UserDirectory {
    db: SqlitePool,
}

impl UserDirectory {
    /// Creates a new `UserDirectory` over a connection pool.
    pub fn new(db: SqlitePool) -> UserDirectory {
        UserDirectory { db }
    }

    /// The underlying connection pool.
    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    /// Creates a user, returning its new id.
    ///
    /// Names are not checked for uniqueness here, only in
    /// [`UserDirectory::register`].
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: UserRequest) -> Result<String, DirectoryError> {
        let user = User {
            id: new_id(),
            name: request.name,
            password: request.password,
            money: request.money,
            admin: request.admin,
        };

        store::insert_user(&user, &self.db).await?;

        tracing::info!(id = %user.id, "created user");

        Ok(user.id)
    }

    /// Registers a user with a zero balance and no admin rights.
    ///
    /// Fails with [`DirectoryError::Conflict`] if the name is taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, password: &str) -> Result<String, DirectoryError> {
        let user = User {
            id: new_id(),
            name: name.to_owned(),
            password: password.to_owned(),
            money: 0,
            admin: false,
        };

        if store::insert_user_unless_name_exists(&user, &self.db).await? {
            tracing::info!(id = %user.id, "registered user");
            Ok(user.id)
        } else {
            tracing::debug!("username already taken");
            Err(DirectoryError::Conflict)
        }
    }

    /// Gets a user by id.
    pub async fn get(&self, id: &str) -> Result<User, DirectoryError> {
        store::find_user(UserFilter::id(id), &self.db)
            .await?
            .map(User::from)
            .ok_or(DirectoryError::NotFound)
    }

    /// Replaces every field of a user but the id.
    ///
    /// There is no upsert; a missing id is [`DirectoryError::NotFound`].
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: &str, request: UserRequest) -> Result<String, DirectoryError> {
        let user = User {
            id: id.to_owned(),
            name: request.name,
            password: request.password,
            money: request.money,
            admin: request.admin,
        };

        if store::update_user(&user, &self.db).await? {
            tracing::info!("updated user");
            Ok(user.id)
        } else {
            Err(DirectoryError::NotFound)
        }
    }

    /// Deletes a user by id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<String, DirectoryError> {
        if store::delete_user(id, &self.db).await? {
            tracing::info!("deleted user");
            Ok(id.to_owned())
        } else {
            Err(DirectoryError::NotFound)
        }
    }

    /// Lists every user.
    ///
    /// An empty directory is [`DirectoryError::Empty`], never an empty list.
    pub async fn list_all(&self) -> Result<Vec<User>, DirectoryError> {
        let users = store::find_users(&self.db).await?;

        if users.is_empty() {
            Err(DirectoryError::Empty)
        } else {
            Ok(users.into_iter().map(User::from).collect())
        }
    }

    /// Checks a name and password.
    ///
    /// Both must match exactly. An unknown name and a wrong password are the
    /// same [`DirectoryError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, name: &str, password: &str) -> Result<LoginUser, DirectoryError> {
        store::find_user(UserFilter::name(name).with_password(password), &self.db)
            .await?
            .map(|row| LoginUser::from(User::from(row)))
            .ok_or(DirectoryError::InvalidCredentials)
    }
}

fn new_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn directory() -> UserDirectory {
        let db = store::connect("sqlite::memory:", 1).await.unwrap();
        UserDirectory::new(db)
    }

    fn request(name: &str, password: &str) -> UserRequest {
        UserRequest {
            name: name.into(),
            password: password.into(),
            money: 0,
            admin: false,
        }
    }

    #[tokio::test]
    pub async fn test_create_then_get() {
        let directory = directory().await;

        let id = directory
            .create(UserRequest {
                money: 250,
                admin: true,
                ..request("carol", "hunter2")
            })
            .await
            .unwrap();
        let user = directory.get(&id).await.unwrap();

        assert_eq!(
            user,
            User {
                id: id.clone(),
                name: "carol".into(),
                password: "hunter2".into(),
                money: 250,
                admin: true,
            }
        );

        // defaults
        let id = directory.create(request("dave", "pw")).await.unwrap();
        let user = directory.get(&id).await.unwrap();
        assert_eq!(user.money, 0);
        assert!(!user.admin);
    }

    #[tokio::test]
    pub async fn test_ids_are_unique() {
        let directory = directory().await;

        let a = directory.create(request("same", "pw")).await.unwrap();
        let b = directory.create(request("same", "pw")).await.unwrap();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[tokio::test]
    pub async fn test_get_missing() {
        let directory = directory().await;

        let result = directory.get("does-not-exist").await;
        assert!(matches!(result, Err(DirectoryError::NotFound)));
    }

    #[tokio::test]
    pub async fn test_register_conflict() {
        let directory = directory().await;

        let id = directory.register("alice", "p1").await.unwrap();
        let result = directory.register("alice", "p2").await;
        assert!(matches!(result, Err(DirectoryError::Conflict)));

        let users = directory.list_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, id);
        assert_eq!(users[0].password, "p1");
        assert_eq!(users[0].money, 0);
        assert!(!users[0].admin);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    pub async fn test_concurrent_register_inserts_once() {
        const TASKS: usize = 16;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("users.db").display());
        let directory = UserDirectory::new(store::connect(&url, 8).await.unwrap());

        let handles = (0..TASKS)
            .map(|i| {
                let directory = directory.clone();
                tokio::spawn(async move { directory.register("zoe", &format!("pw{}", i)).await })
            })
            .collect::<Vec<_>>();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DirectoryError::Conflict) => conflicts += 1,
                Err(err) => panic!("unexpected error: {}", err),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, TASKS - 1);

        let users = directory.list_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "zoe");

        directory.db().close().await;
    }

    #[tokio::test]
    pub async fn test_register_after_create_conflicts() {
        let directory = directory().await;

        directory.create(request("alice", "p1")).await.unwrap();
        let result = directory.register("alice", "p2").await;

        assert!(matches!(result, Err(DirectoryError::Conflict)));
    }

    #[tokio::test]
    pub async fn test_update() {
        let directory = directory().await;

        let id = directory.create(request("erin", "old")).await.unwrap();
        let returned = directory
            .update(
                &id,
                UserRequest {
                    name: "erin2".into(),
                    password: "new".into(),
                    money: 42,
                    admin: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(returned, id);

        let user = directory.get(&id).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "erin2");
        assert_eq!(user.password, "new");
        assert_eq!(user.money, 42);
        assert!(user.admin);
    }

    #[tokio::test]
    pub async fn test_update_missing_creates_nothing() {
        let directory = directory().await;

        let result = directory.update("ghost", request("ghost", "pw")).await;
        assert!(matches!(result, Err(DirectoryError::NotFound)));
        assert!(matches!(
            directory.list_all().await,
            Err(DirectoryError::Empty)
        ));
    }

    #[tokio::test]
    pub async fn test_delete_twice() {
        let directory = directory().await;

        let id = directory.create(request("frank", "pw")).await.unwrap();
        assert_eq!(directory.delete(&id).await.unwrap(), id);

        assert!(matches!(
            directory.get(&id).await,
            Err(DirectoryError::NotFound)
        ));
        assert!(matches!(
            directory.delete(&id).await,
            Err(DirectoryError::NotFound)
        ));
    }

    #[tokio::test]
    pub async fn test_list_all() {
        let directory = directory().await;

        assert!(matches!(
            directory.list_all().await,
            Err(DirectoryError::Empty)
        ));

        let id = directory.create(request("gina", "pw")).await.unwrap();
        let users = directory.list_all().await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, id);
        assert_eq!(users[0].name, "gina");
    }

    #[tokio::test]
    pub async fn test_login() {
        let directory = directory().await;

        let id = directory.create(request("bob", "secret")).await.unwrap();

        let user = directory.login("bob", "secret").await.unwrap();
        assert_eq!(
            user,
            LoginUser {
                id,
                name: "bob".into()
            }
        );

        assert!(matches!(
            directory.login("bob", "wrong").await,
            Err(DirectoryError::InvalidCredentials)
        ));
        assert!(matches!(
            directory.login("nobody", "secret").await,
            Err(DirectoryError::InvalidCredentials)
        ));
        // case sensitive
        assert!(matches!(
            directory.login("Bob", "secret").await,
            Err(DirectoryError::InvalidCredentials)
        ));
    }
}
