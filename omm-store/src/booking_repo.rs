use async_trait::async_trait;
use omm_core::{BookingRecord, BookingRepository, BoxError};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert_booking(&self, booking: &BookingRecord) -> Result<Uuid, BoxError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, trip_id, user_id, participant_count, insurance, payment_plan,
                                  total_cents, deposit_cents, currency, status, special_requests, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.id)
        .bind(booking.trip_id)
        .bind(&booking.user_id)
        .bind(booking.participant_count)
        .bind(&booking.insurance)
        .bind(&booking.payment_plan)
        .bind(booking.total_cents)
        .bind(booking.deposit_cents)
        .bind(&booking.currency)
        .bind(&booking.status)
        .bind(&booking.special_requests)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;

        info!("Booking row inserted: {}", booking.id);
        Ok(booking.id)
    }

    async fn has_prior_booking(&self, user_id: &str) -> Result<bool, BoxError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
