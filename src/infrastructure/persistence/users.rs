use crate::domain::entities::{Role, User, UserStatus};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::persistence::{nullable_text, Database};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

const USER_COLUMNS: &str =
    "id, name, email, phone, role, status, password_hash, created_at, updated_at";

/// Stored role names that no longer parse land on the lowest privilege.
fn parse_role(value: &str) -> Role {
    value.parse().unwrap_or_else(|_| {
        tracing::warn!("Unknown stored role '{}', treating as 'user'", value);
        Role::User
    })
}

fn user_from_row(row: &AnyRow) -> DomainResult<User> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: nullable_text(row, "phone"),
        role: parse_role(&role),
        status: status.parse::<UserStatus>().map_err(DomainError::Internal)?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for Database {
    async fn create_user(&self, user: &User) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, phone, role, status, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self, limit: i64, offset: i64) -> DomainResult<(Vec<User>, i64)> {
        let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC, email ASC LIMIT ? OFFSET ?",
            USER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let users = rows.iter().map(user_from_row).collect::<DomainResult<Vec<_>>>()?;
        Ok((users, total))
    }

    async fn update_user_access(
        &self,
        id: &str,
        role: Role,
        status: UserStatus,
        updated_at: &str,
    ) -> DomainResult<()> {
        let result = sqlx::query("UPDATE users SET role = ?, status = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }
}
