//! Currency management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::ValidatedJson};
use tillpoint_core::currency::{Conversion, Currency, CurrencyUpdate, NewCurrency};
use tillpoint_db::CurrencyRepository;
use tillpoint_shared::CurrencyId;

/// Creates the currency routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(list_currencies).post(create_currency))
        .route("/currencies/convert", get(convert_amount))
        .route(
            "/currencies/{id}",
            get(get_currency)
                .put(update_currency)
                .delete(delete_currency),
        )
        .route("/currencies/{id}/set-default", post(set_default_currency))
}

/// Request body for creating or replacing a currency.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// ISO-like code.
    #[validate(length(min = 2, max = 10))]
    pub code: String,
    /// Display symbol.
    #[validate(length(min = 1, max = 10))]
    pub symbol: String,
    /// Rate relative to the current default currency.
    pub exchange_rate: Decimal,
    /// Make this currency the default.
    #[serde(default)]
    pub is_default: Option<bool>,
}

/// Query parameters for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Amount in the source currency.
    pub amount: Decimal,
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
}

/// Response for a currency.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyResponse {
    /// Currency ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// ISO-like code.
    pub code: String,
    /// Display symbol.
    pub symbol: String,
    /// Rate relative to the default currency, as decimal text.
    pub exchange_rate: Decimal,
    /// Whether this is the default currency.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Currency> for CurrencyResponse {
    fn from(c: Currency) -> Self {
        Self {
            id: c.id.into_inner(),
            name: c.name,
            code: c.code,
            symbol: c.symbol,
            exchange_rate: c.exchange_rate,
            is_default: c.is_default,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Plain message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

fn repository(state: &AppState) -> CurrencyRepository {
    CurrencyRepository::new((*state.db).clone())
}

/// GET `/currencies` - List all currencies, newest first.
async fn list_currencies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CurrencyResponse>>, ApiError> {
    let currencies = repository(&state).list().await?;
    Ok(Json(currencies.into_iter().map(Into::into).collect()))
}

/// GET `/currencies/{id}` - Get one currency.
async fn get_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CurrencyResponse>, ApiError> {
    let currency = repository(&state).find(CurrencyId::from_uuid(id)).await?;
    Ok(Json(currency.into()))
}

/// POST `/currencies` - Create a currency.
async fn create_currency(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CurrencyRequest>,
) -> Result<(StatusCode, Json<CurrencyResponse>), ApiError> {
    let input = NewCurrency {
        name: payload.name,
        code: payload.code,
        symbol: payload.symbol,
        exchange_rate: payload.exchange_rate,
        is_default: payload.is_default.unwrap_or(false),
    };

    let currency = repository(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(currency.into())))
}

/// PUT `/currencies/{id}` - Replace a currency's fields.
///
/// `isDefault: true` on a non-default currency re-bases every rate onto it.
async fn update_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CurrencyRequest>,
) -> Result<Json<CurrencyResponse>, ApiError> {
    let input = CurrencyUpdate {
        name: payload.name,
        code: payload.code,
        symbol: payload.symbol,
        exchange_rate: payload.exchange_rate,
        is_default: payload.is_default,
    };

    let currency = repository(&state)
        .update(CurrencyId::from_uuid(id), input)
        .await?;
    Ok(Json(currency.into()))
}

/// DELETE `/currencies/{id}` - Delete a non-default currency.
async fn delete_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let currency = repository(&state).delete(CurrencyId::from_uuid(id)).await?;
    Ok(Json(MessageResponse {
        message: format!("Currency {} deleted", currency.code),
    }))
}

/// POST `/currencies/{id}/set-default` - Make a currency the default and
/// re-base all exchange rates onto it.
async fn set_default_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CurrencyResponse>, ApiError> {
    let currency = repository(&state)
        .set_default(CurrencyId::from_uuid(id))
        .await?;
    Ok(Json(currency.into()))
}

/// GET `/currencies/convert?amount=&from=&to=` - Convert an amount.
async fn convert_amount(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<Conversion>, ApiError> {
    let conversion = repository(&state)
        .convert(query.amount, &query.from, &query.to)
        .await?;
    Ok(Json(conversion))
}
