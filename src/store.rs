//! Record store access.
//!
//! Every function here is a single statement against the `user` table.

use std::str::FromStr as _;

use sqlx::{
    Executor, FromRow, QueryBuilder, Sqlite, SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use user_directory_model::User;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// A row in the database representing a user.
#[derive(Clone, Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub password: String,
    pub money: i64,
    pub admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            password: row.password,
            money: row.money,
            admin: row.admin,
        }
    }
}

/// An equality filter over user fields.
///
/// Fields left as `None` match anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserFilter<'a> {
    pub id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl<'a> UserFilter<'a> {
    /// Matches a user by id.
    pub fn id(id: &'a str) -> UserFilter<'a> {
        UserFilter {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Matches a user by name.
    pub fn name(name: &'a str) -> UserFilter<'a> {
        UserFilter {
            name: Some(name),
            ..Default::default()
        }
    }

    /// Additionally matches the password.
    pub fn with_password(self, password: &'a str) -> UserFilter<'a> {
        UserFilter {
            password: Some(password),
            ..self
        }
    }

    fn push_where(&self, builder: &mut QueryBuilder<'a, Sqlite>) {
        let conditions = [
            ("id", self.id),
            ("name", self.name),
            ("password", self.password),
        ];

        let mut first = true;
        for (column, value) in conditions {
            let Some(value) = value else {
                continue;
            };

            builder.push(if first { " WHERE " } else { " AND " });
            builder.push(column);
            builder.push(" = ");
            builder.push_bind(value);

            first = false;
        }
    }
}

/// Opens a connection pool and runs pending migrations.
///
/// The database file is created if it does not exist. In-memory databases
/// must be opened with `max_connections = 1`, since every connection gets its
/// own database.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let db = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&db).await?;

    Ok(db)
}

/// Inserts a user.
pub async fn insert_user<'c, E>(user: &User, db: E) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO user (id, name, password, money, admin)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.password)
    .bind(user.money)
    .bind(user.admin)
    .execute(db)
    .await
    .map(|_| ())
}

/// Inserts a user only if no user with the same name exists.
///
/// The existence check and the insert are one statement, so two concurrent
/// calls cannot both succeed. Returns `false` if the name was taken.
pub async fn insert_user_unless_name_exists<'c, E>(user: &User, db: E) -> Result<bool, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO user (id, name, password, money, admin)
        SELECT $1, $2, $3, $4, $5
        WHERE NOT EXISTS (SELECT 1 FROM user WHERE name = $2)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.password)
    .bind(user.money)
    .bind(user.admin)
    .execute(db)
    .await
    .map(|result| result.rows_affected() > 0)
}

/// Finds the first user matching a filter.
pub async fn find_user<'c, E>(filter: UserFilter<'_>, db: E) -> Result<Option<UserRow>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let mut builder = QueryBuilder::new("SELECT id, name, password, money, admin FROM user");
    filter.push_where(&mut builder);
    builder.push(" LIMIT 1");

    builder
        .build_query_as::<UserRow>()
        .fetch_optional(db)
        .await
}

/// Fetches every user, in whatever order the database returns them.
pub async fn find_users<'c, E>(db: E) -> Result<Vec<UserRow>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, password, money, admin
        FROM user
        "#,
    )
    .fetch_all(db)
    .await
}

/// Replaces every field of a user but its id.
///
/// Returns `false` if no user has the id.
pub async fn update_user<'c, E>(user: &User, db: E) -> Result<bool, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE user
        SET name = $2, password = $3, money = $4, admin = $5
        WHERE id = $1
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.password)
    .bind(user.money)
    .bind(user.admin)
    .execute(db)
    .await
    .map(|result| result.rows_affected() > 0)
}

/// Deletes a user by id.
///
/// Returns `false` if no user has the id.
pub async fn delete_user<'c, E>(id: &str, db: E) -> Result<bool, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        DELETE FROM user
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await
    .map(|result| result.rows_affected() > 0)
}
