use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::*;

/// A row of the `orders` table as written by the ingestion workflow.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub status: String,
    pub customer_email: Option<String>,
    pub email_subject: Option<String>,
    pub email_message_id: Option<String>,
    pub email_body: Option<String>,
    pub document_url: Option<String>,
    pub order_data: Option<serde_json::Value>,
}

/// Partial column set accepted by an order update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChanges {
    pub status: Option<String>,
    pub order_data: Option<serde_json::Value>,
}

impl OrderChanges {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            order_data: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.order_data.is_none()
    }
}
