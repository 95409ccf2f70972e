use common::error::{AppError, Res};
use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    dtos::developer::{DeveloperFilter, DeveloperUpdate, NewDeveloper},
    models::developer::Developer,
};

fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &DeveloperFilter) {
    builder.push(" WHERE ").push(filter.column()).push(" = ");
    match filter {
        DeveloperFilter::ById(id) => builder.push_bind(*id),
        DeveloperFilter::ByEmail(email) => builder.push_bind(email.clone()),
        DeveloperFilter::ByToken(token) => builder.push_bind(token.clone()),
    };
}

const EMAIL_CONSTRAINT: &str = "developers_email_key";
const TOKEN_CONSTRAINT: &str = "developers_token_key";

pub(crate) fn email_taken() -> AppError {
    AppError::BadRequest("Email already exists".to_string())
}

/// Tokens are issued server side, so a clash is our fault, not the caller's.
pub(crate) fn token_taken() -> AppError {
    AppError::Internal("Issued token is already in use".to_string())
}

fn unique_violation(constraint: Option<&str>) -> AppError {
    match constraint {
        Some(EMAIL_CONSTRAINT) => email_taken(),
        Some(TOKEN_CONSTRAINT) => token_taken(),
        _ => AppError::BadRequest("Developer already exists".to_string()),
    }
}

fn map_write_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return unique_violation(db_error.constraint());
        }
    }
    AppError::from(error)
}

fn find_query(filter: &DeveloperFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM developers");
    push_filter(&mut builder, filter);
    builder
}

pub async fn find_developer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: &DeveloperFilter,
) -> Res<Option<Developer>> {
    find_query(filter)
        .build_query_as::<Developer>()
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_developers<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<Developer>> {
    sqlx::query_as::<_, Developer>("SELECT * FROM developers ORDER BY created_at")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_developer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &NewDeveloper,
) -> Res<Developer> {
    sqlx::query_as::<_, Developer>(
        r#"
        INSERT INTO developers (name, email, password, salt, token, integration_engineer)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&data.profile.name)
    .bind(&data.profile.email)
    .bind(&data.password)
    .bind(&data.salt)
    .bind(&data.token)
    .bind(&data.profile.integration_engineer)
    .fetch_one(executor)
    .await
    .map_err(map_write_error)
}

/// Overwrites the provided fields on the single row matching `filter`.
///
/// Returns `Ok(None)` when nothing matched. An empty update is a plain lookup.
pub async fn update_developer<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: &DeveloperFilter,
    update: &DeveloperUpdate,
) -> Res<Option<Developer>> {
    if update.is_empty() {
        return find_developer(executor, filter).await;
    }

    update_query(filter, update)
        .build_query_as::<Developer>()
        .fetch_optional(executor)
        .await
        .map_err(map_write_error)
}

/// `UPDATE ... SET` over the provided fields only. Expects a non-empty update.
fn update_query(
    filter: &DeveloperFilter,
    update: &DeveloperUpdate,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE developers SET ");
    let mut set = builder.separated(", ");
    if let Some(name) = &update.name {
        set.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(email) = &update.email {
        set.push("email = ").push_bind_unseparated(email.clone());
    }
    if let Some(engineer) = &update.integration_engineer {
        set.push("integration_engineer = ")
            .push_bind_unseparated(engineer.clone());
    }
    if let Some(is_admin) = update.is_admin {
        set.push("is_admin = ").push_bind_unseparated(is_admin);
    }
    if let Some(is_paid) = update.is_paid {
        set.push("is_paid = ").push_bind_unseparated(is_paid);
    }
    if let Some(stripe_token) = &update.stripe_token {
        set.push("stripe_token = ")
            .push_bind_unseparated(stripe_token.clone());
    }
    if let Some(next_payment_time) = update.next_payment_time {
        set.push("next_payment_time = ")
            .push_bind_unseparated(next_payment_time);
    }
    if let Some(password) = &update.password {
        set.push("password = ").push_bind_unseparated(password.clone());
    }
    if let Some(token) = &update.token {
        set.push("token = ").push_bind_unseparated(token.clone());
    }
    if let Some(last_active_at) = update.last_active_at {
        set.push("last_active_at = ")
            .push_bind_unseparated(last_active_at);
    }
    push_filter(&mut builder, filter);
    builder.push(" RETURNING *");
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn lookups_bind_the_filter_value() {
        assert_eq!(
            find_query(&DeveloperFilter::by_id(Uuid::new_v4())).sql(),
            "SELECT * FROM developers WHERE id = $1"
        );
        assert_eq!(
            find_query(&DeveloperFilter::by_token("abc")).sql(),
            "SELECT * FROM developers WHERE token = $1"
        );
    }

    #[test]
    fn updates_set_only_provided_columns() {
        let update = DeveloperUpdate {
            name: Some("Ada".to_string()),
            token: Some("new-token".to_string()),
            ..Default::default()
        };
        assert_eq!(
            update_query(&DeveloperFilter::by_email("ada@example.com"), &update).sql(),
            "UPDATE developers SET name = $1, token = $2 WHERE email = $3 RETURNING *"
        );
    }

    #[test]
    fn password_updates_never_touch_salt() {
        let update = DeveloperUpdate::password_hash("f1ac9702");
        let query = update_query(&DeveloperFilter::by_id(Uuid::new_v4()), &update);
        assert_eq!(
            query.sql(),
            "UPDATE developers SET password = $1 WHERE id = $2 RETURNING *"
        );
    }

    #[test]
    fn unique_violations_name_the_clashing_column() {
        assert!(matches!(
            unique_violation(Some("developers_email_key")),
            AppError::BadRequest(message) if message == "Email already exists"
        ));
        assert!(matches!(
            unique_violation(Some("developers_token_key")),
            AppError::Internal(_)
        ));
        assert!(matches!(unique_violation(None), AppError::BadRequest(_)));
    }
}
