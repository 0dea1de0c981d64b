use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use futures_util::{Stream, StreamExt};
use omm_booking::{InsuranceOption, ParticipantField, PaymentPlan, Preferences, WizardMode, WizardView};
use omm_shared::models::events::AvailabilityChangedEvent;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::WatchStream;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{customer_auth_middleware, CustomerClaims};
use crate::sessions::SharedWizard;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ParticipantAddedResponse {
    pub participant_id: String,
    pub wizard: WizardView,
}

#[derive(Debug, Deserialize)]
pub struct UpdateParticipantRequest {
    pub field: ParticipantField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct InsuranceRequest {
    pub insurance: InsuranceOption,
}

#[derive(Debug, Deserialize)]
pub struct PaymentPlanRequest {
    pub payment_plan: PaymentPlan,
}

#[derive(Debug, Deserialize)]
pub struct ConsentsRequest {
    pub agreed_to_terms: bool,
    #[serde(default)]
    pub agreed_to_cancellation_policy: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: WizardMode,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub booking_id: Uuid,
    pub redirect_to: String,
    pub wizard: WizardView,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/v1/trips/{trip_id}/booking",
            post(open_booking).get(get_booking).delete(close_booking),
        )
        .route("/v1/trips/{trip_id}/booking/participants", post(add_participant))
        .route(
            "/v1/trips/{trip_id}/booking/participants/{participant_id}",
            patch(update_participant).delete(remove_participant),
        )
        .route("/v1/trips/{trip_id}/booking/preferences", put(set_preferences))
        .route("/v1/trips/{trip_id}/booking/insurance", put(set_insurance))
        .route("/v1/trips/{trip_id}/booking/payment-plan", put(set_payment_plan))
        .route("/v1/trips/{trip_id}/booking/consents", put(set_consents))
        .route("/v1/trips/{trip_id}/booking/advance", post(advance))
        .route("/v1/trips/{trip_id}/booking/retreat", post(retreat))
        .route("/v1/trips/{trip_id}/booking/mode", put(switch_mode))
        .route("/v1/trips/{trip_id}/booking/reset", post(reset))
        .route("/v1/trips/{trip_id}/booking/save", post(save_progress))
        .route("/v1/trips/{trip_id}/booking/submit", post(submit))
        .route(
            "/v1/trips/{trip_id}/booking/availability/stream",
            get(availability_stream),
        )
        .route_layer(middleware::from_fn_with_state(state, customer_auth_middleware))
}

async fn session(state: &AppState, claims: &CustomerClaims, trip_id: Uuid) -> Result<SharedWizard, AppError> {
    state
        .sessions
        .get(&claims.sub, trip_id)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("No booking in progress for trip {}", trip_id)))
}

// ============================================================================
// Lifecycle
// ============================================================================

async fn open_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = state.sessions.open(&state.deps, &claims.sub, trip_id).await?;
    let wizard = wizard.lock().await;
    Ok(Json(wizard.view()))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let wizard = wizard.lock().await;
    Ok(Json(wizard.view()))
}

async fn close_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.close(&claims.sub, trip_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFoundError(format!("No booking in progress for trip {}", trip_id)))
    }
}

// ============================================================================
// Draft edits
// ============================================================================

async fn add_participant(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ParticipantAddedResponse>), AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    let participant_id = wizard.add_participant();
    Ok((
        StatusCode::CREATED,
        Json(ParticipantAddedResponse {
            participant_id,
            wizard: wizard.view(),
        }),
    ))
}

async fn update_participant(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path((trip_id, participant_id)): Path<(Uuid, String)>,
    Json(req): Json<UpdateParticipantRequest>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.update_participant(&participant_id, req.field, req.value)?;
    Ok(Json(wizard.view()))
}

async fn remove_participant(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path((trip_id, participant_id)): Path<(Uuid, String)>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.remove_participant(&participant_id)?;
    Ok(Json(wizard.view()))
}

async fn set_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
    Json(preferences): Json<Preferences>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.set_preferences(preferences);
    Ok(Json(wizard.view()))
}

async fn set_insurance(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<InsuranceRequest>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.set_insurance(req.insurance);
    Ok(Json(wizard.view()))
}

async fn set_payment_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<PaymentPlanRequest>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.set_payment_plan(req.payment_plan);
    Ok(Json(wizard.view()))
}

async fn set_consents(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<ConsentsRequest>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.set_consents(req.agreed_to_terms, req.agreed_to_cancellation_policy);
    Ok(Json(wizard.view()))
}

// ============================================================================
// Navigation
// ============================================================================

async fn advance(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.advance()?;
    Ok(Json(wizard.view()))
}

async fn retreat(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.retreat();
    Ok(Json(wizard.view()))
}

async fn switch_mode(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.switch_mode(req.mode);
    Ok(Json(wizard.view()))
}

async fn reset(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let mut wizard = wizard.lock().await;
    wizard.reset().await;
    Ok(Json(wizard.view()))
}

async fn save_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let wizard = wizard.lock().await;
    wizard.save_progress().await?;
    Ok(Json(wizard.view()))
}

async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let (booking_id, view) = {
        let mut wizard = wizard.lock().await;
        let booking_id = wizard
            .submit(|draft| {
                info!(
                    user_id = %claims.sub,
                    %trip_id,
                    participants = draft.participants.len(),
                    "Booking handed off for confirmation"
                );
            })
            .await?;
        (booking_id, wizard.view())
    };

    // The booking is final; the wizard has nothing left to do.
    state.sessions.close(&claims.sub, trip_id).await;

    Ok(Json(SubmitResponse {
        booking_id,
        redirect_to: format!("/bookings/{}/confirmation", booking_id),
        wizard: view,
    }))
}

// ============================================================================
// Availability
// ============================================================================

async fn availability_stream(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let wizard = session(&state, &claims, trip_id).await?;
    let rx = wizard.lock().await.subscribe_availability();

    let stream = WatchStream::new(rx).filter_map(move |snapshot| async move {
        let snapshot = snapshot?;
        let event = AvailabilityChangedEvent {
            trip_id,
            spots_left: snapshot.spots_left,
            is_available: snapshot.is_available,
            timestamp: snapshot.checked_at.timestamp(),
        };
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event("availability").data(data)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
