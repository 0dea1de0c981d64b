use async_trait::async_trait;
use chrono::NaiveDate;
use omm_core::{BoxError, SenseiSummary, TripCapacity, TripDetails, TripRepository};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    title: String,
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    price_cents: i32,
    currency: String,
    max_participants: i32,
    sensei_id: Option<Uuid>,
    sensei_name: Option<String>,
    sensei_avatar_url: Option<String>,
}

impl From<TripRow> for TripDetails {
    fn from(row: TripRow) -> Self {
        let sensei = match (row.sensei_id, row.sensei_name) {
            (Some(id), Some(display_name)) => Some(SenseiSummary {
                id,
                display_name,
                avatar_url: row.sensei_avatar_url,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            destination: row.destination,
            start_date: row.start_date,
            end_date: row.end_date,
            price_cents: row.price_cents,
            currency: row.currency,
            max_participants: row.max_participants,
            sensei,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CapacityRow {
    id: Uuid,
    max_participants: i32,
    current_participants: i32,
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn get_trip(&self, trip_id: Uuid) -> Result<Option<TripDetails>, BoxError> {
        let row = sqlx::query_as::<_, TripRow>(
            r#"
            SELECT t.id, t.title, t.destination, t.start_date, t.end_date,
                   t.price_cents, t.currency, t.max_participants,
                   s.id AS sensei_id, s.display_name AS sensei_name, s.avatar_url AS sensei_avatar_url
            FROM trips t
            LEFT JOIN senseis s ON s.id = t.sensei_id
            WHERE t.id = $1
            "#,
        )
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TripDetails::from))
    }

    async fn get_capacity(&self, trip_id: Uuid) -> Result<Option<TripCapacity>, BoxError> {
        let row = sqlx::query_as::<_, CapacityRow>(
            "SELECT id, max_participants, current_participants FROM trips WHERE id = $1",
        )
        .bind(trip_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| TripCapacity {
            trip_id: r.id,
            max_participants: r.max_participants,
            current_participants: r.current_participants,
        }))
    }
}
