use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{
    AppError, AppResult, ORDER_DELETE_FAILED, ORDER_SAVE_FAILED, STATUS_UPDATE_FAILED,
};
use crate::models::OrderChanges;
use crate::refresh::refresh_overview;
use crate::shipment::ShipmentData;
use crate::state::AppState;
use crate::views::{OrderDetail, OrderSummary, OrdersOverview};
use crate::workflow::{is_known_status, Transition};

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Deserialize)]
pub struct DeleteOrderQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Ids that do not parse are treated like ids that do not exist.
fn parse_order_id(raw: &str) -> AppResult<i64> {
    raw.trim().parse().map_err(|_| AppError::not_found())
}

pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<OrdersOverview>> {
    if let Some(overview) = state.views.overview().await {
        return Ok(Json(overview));
    }

    let overview = refresh_overview(&state).await.map_err(|err| {
        error!(error = %err, "failed to load orders");
        AppError::from(err)
    })?;
    Ok(Json(overview))
}

pub async fn list_orders_by_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<OrderSummary>>> {
    let status = query.status.trim();
    if status.is_empty() {
        return Err(AppError::bad_request("status must not be empty"));
    }

    let rows = state.orders.list_by_status(status).await.map_err(|err| {
        error!(error = %err, %status, "failed to load orders by status");
        AppError::from(err)
    })?;
    Ok(Json(rows.iter().map(OrderSummary::from_order).collect()))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let order_id = parse_order_id(&raw_id)?;
    if let Some(detail) = state.views.order(order_id).await {
        return Ok(Json(detail));
    }

    let generation = state.views.generation();
    let order = state
        .orders
        .find(order_id)
        .await
        .map_err(|err| {
            error!(order_id, error = %err, "failed to load order");
            AppError::from(err)
        })?
        .ok_or_else(AppError::not_found)?;

    let detail = OrderDetail::from_order(&order);
    state
        .views
        .store_order(generation, order_id, detail.clone())
        .await;
    Ok(Json(detail))
}

pub async fn take_into_progress(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    apply_transition(&state, &raw_id, Transition::TakeIntoProgress).await
}

pub async fn mark_processed(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    apply_transition(&state, &raw_id, Transition::MarkProcessed).await
}

async fn apply_transition(
    state: &AppState,
    raw_id: &str,
    transition: Transition,
) -> AppResult<Json<OrderDetail>> {
    let order_id = parse_order_id(raw_id)?;

    let current = state
        .orders
        .find(order_id)
        .await
        .map_err(|err| {
            error!(order_id, error = %err, %transition, "failed to load order for status change");
            AppError::write_failed(STATUS_UPDATE_FAILED)
        })?
        .ok_or_else(AppError::not_found)?;

    let target = transition.apply(&current.status).map_err(|err| {
        warn!(order_id, error = %err, "rejected status transition");
        AppError::conflict(err.to_string())
    })?;

    let updated = state
        .orders
        .update(order_id, OrderChanges::status(target))
        .await
        .map_err(|err| {
            error!(order_id, error = %err, %transition, "failed to update order status");
            AppError::write_failed(STATUS_UPDATE_FAILED)
        })?
        .ok_or_else(AppError::not_found)?;

    state.views.invalidate_order(order_id).await;
    info!(
        order_id,
        from = %current.status,
        to = %updated.status,
        "order status changed"
    );

    Ok(Json(OrderDetail::from_order(&updated)))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<Json<OrderDetail>> {
    let order_id = parse_order_id(&raw_id)?;
    let changes = parse_order_update(&body)?;
    if changes.is_empty() {
        return Err(AppError::bad_request("no changes provided"));
    }

    let status_changed = changes.status.is_some();
    let data_changed = changes.order_data.is_some();
    let updated = state
        .orders
        .update(order_id, changes)
        .await
        .map_err(|err| {
            error!(order_id, error = %err, "failed to update order");
            AppError::write_failed(ORDER_SAVE_FAILED)
        })?
        .ok_or_else(AppError::not_found)?;

    state.views.invalidate_order(order_id).await;
    info!(
        order_id,
        status = %updated.status,
        status_changed,
        data_changed,
        "order updated"
    );

    Ok(Json(OrderDetail::from_order(&updated)))
}

fn parse_order_update(body: &Value) -> AppResult<OrderChanges> {
    let body = body
        .as_object()
        .ok_or_else(|| AppError::bad_request("request body must be an object"))?;

    let status = match body.get("status") {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            if !is_known_status(trimmed) {
                return Err(AppError::bad_request(format!("unknown status {trimmed:?}")));
            }
            Some(trimmed.to_string())
        }
        Some(other) => {
            return Err(AppError::bad_request(format!(
                "status must be a string, got {other}"
            )))
        }
    };

    let order_data = match body.get("order_data") {
        None | Some(Value::Null) => None,
        Some(form) => Some(
            ShipmentData::from_form(form)
                .map_err(AppError::bad_request)?
                .to_value(),
        ),
    };

    Ok(OrderChanges { status, order_data })
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<DeleteOrderQuery>,
) -> AppResult<impl IntoResponse> {
    let order_id = parse_order_id(&raw_id)?;
    if !query.confirm {
        return Err(AppError::bad_request(
            "deleting an order must be confirmed with confirm=true",
        ));
    }

    let deleted = state.orders.delete(order_id).await.map_err(|err| {
        error!(order_id, error = %err, "failed to delete order");
        AppError::write_failed(ORDER_DELETE_FAILED)
    })?;
    if !deleted {
        return Err(AppError::not_found());
    }

    state.views.invalidate_order(order_id).await;
    info!(order_id, "order deleted");
    Ok(StatusCode::NO_CONTENT)
}
