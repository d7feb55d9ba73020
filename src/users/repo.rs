use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::User;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, description, avatar, is_admin, created_at, updated_at";

impl User {
    /// Find a user by (already normalized) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Insert a new user. The caller supplies the password already hashed;
    /// plaintext never reaches this layer. The unique constraint on email is
    /// the final arbiter under concurrent registration.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        description: &str,
        avatar: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, description, avatar)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(description)
        .bind(avatar)
        .fetch_one(db)
        .await
    }

    /// Persist a mutated record. `password_hash` is written as-is: rehashing
    /// happens upstream only when a new plaintext was supplied, so unrelated
    /// profile updates never touch an existing hash.
    pub async fn update(&self, db: &PgPool) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, description = $5,
                avatar = $6, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(&self.description)
        .bind(&self.avatar)
        .fetch_one(db)
        .await
    }

    pub async fn list(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(db)
        .await
    }
}
