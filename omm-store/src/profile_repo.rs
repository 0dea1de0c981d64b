use async_trait::async_trait;
use chrono::NaiveDate;
use omm_core::{BoxError, ProfileRepository, UserProfile};
use omm_shared::Masked;
use sqlx::PgPool;

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, BoxError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, first_name, last_name, email, phone, date_of_birth
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserProfile {
            user_id: r.user_id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: Masked(r.email),
            phone: r.phone.map(Masked),
            date_of_birth: r.date_of_birth,
        }))
    }
}
