use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USERNAME_CONSTRAINT: &str = "users_pkey";
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    user_name: String,
    email: String,
    full_name: Option<String>,
    first_name: String,
    last_name: String,
    pass_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let full_name = match r.full_name {
            Some(name) if !name.trim().is_empty() => Some(PersonName::new("full_name", name)?),
            _ => None,
        };

        Ok(User {
            username: Username::new(r.user_name)?,
            email: EmailAddress::new(r.email)?,
            full_name,
            first_name: PersonName::new("first_name", r.first_name)?,
            last_name: PersonName::new("last_name", r.last_name)?,
            password_hash: r.pass_hash,
            created_at: r.created_at,
        })
    }
}

/// Translate unique violations on insert/update into domain conflicts.
fn write_error(e: sqlx::Error, user: &User) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => {
                    return UserError::UsernameAlreadyExists(user.username.as_str().to_string())
                }
                Some(EMAIL_CONSTRAINT) => {
                    return UserError::EmailAlreadyExists(user.email.as_str().to_string())
                }
                _ => {}
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_name, email, full_name, first_name, last_name, pass_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.full_name.as_ref().map(PersonName::as_str))
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &user))?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_name, email, full_name, first_name, last_name, pass_hash, created_at
            FROM users
            WHERE user_name = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_name, email, full_name, first_name, last_name, pass_hash, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_name, email, full_name, first_name, last_name, pass_hash, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, full_name = $3, first_name = $4, last_name = $5, pass_hash = $6
            WHERE user_name = $1
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.full_name.as_ref().map(PersonName::as_str))
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &user))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.username.as_str().to_string()));
        }

        Ok(user)
    }
}
