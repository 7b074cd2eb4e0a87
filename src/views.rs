//! JSON view models for the order overview and the single-order page.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::display::{self, BadgeVariant};
use crate::models::Order;
use crate::shipment::{self, GoodsItem, Location, ShipmentData};
use crate::workflow::{AvailableActions, StatusBucket};

const EMPTY_GROUP_NOTICE: &str = "Geen orders gevonden.";
const NO_GOODS_NOTICE: &str = "Geen producten opgegeven";
const NO_SUBJECT: &str = "Geen onderwerp";
const NO_PDF_NOTICE: &str = "Geen PDF bijlage gevonden voor deze order";
const RESTRICTED_PDF_NOTICE: &str =
    "PDF is opgeslagen in Google Cloud Storage maar niet publiek toegankelijk.";
/// Documents on this host need a signed-in browser session and cannot be embedded.
const RESTRICTED_DOCUMENT_HOST: &str = "storage.googleapis.com";

#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: i64,
    pub status: String,
    pub debtor: String,
    pub transport_type: String,
    pub loading_from: String,
    pub loading_until: String,
    pub created_at: String,
}

impl OrderSummary {
    pub fn from_order(order: &Order) -> Self {
        let data = shipment::normalize(order.order_data.as_ref());
        let transport = &data.transport;
        Self {
            id: order.id,
            status: order.status.clone(),
            debtor: display::debtor_from_email(order.customer_email.as_deref()),
            transport_type: display::text(transport.transport_type.as_deref()),
            loading_from: display::date_time(
                transport.loading_date.as_deref(),
                transport.window_start.as_deref(),
            ),
            loading_until: display::date_time(
                transport.loading_date.as_deref(),
                transport.window_end.as_deref(),
            ),
            created_at: display::rfc3339(order.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusGroup {
    pub bucket: StatusBucket,
    pub title: &'static str,
    pub count: usize,
    pub orders: Vec<OrderSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_notice: Option<&'static str>,
}

impl StatusGroup {
    fn new(bucket: StatusBucket, orders: Vec<OrderSummary>) -> Self {
        Self {
            bucket,
            title: bucket.title(),
            count: orders.len(),
            empty_notice: orders.is_empty().then_some(EMPTY_GROUP_NOTICE),
            orders,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrdersOverview {
    pub groups: Vec<StatusGroup>,
    /// Orders whose stored status is outside the workflow. Listed separately so
    /// they do not silently disappear from the overview.
    pub unrecognized: Vec<OrderSummary>,
    pub refresh_interval_seconds: u64,
    pub generated_at: String,
}

impl OrdersOverview {
    pub fn group(&self, bucket: StatusBucket) -> Option<&StatusGroup> {
        self.groups.iter().find(|group| group.bucket == bucket)
    }
}

/// Groups rows by workflow bucket, keeping the store's newest-first order.
pub fn build_overview(orders: &[Order], refresh_interval: Duration) -> OrdersOverview {
    let mut new = Vec::new();
    let mut in_progress = Vec::new();
    let mut processed = Vec::new();
    let mut unrecognized = Vec::new();

    for order in orders {
        let summary = OrderSummary::from_order(order);
        match StatusBucket::of(&order.status) {
            Some(StatusBucket::New) => new.push(summary),
            Some(StatusBucket::InProgress) => in_progress.push(summary),
            Some(StatusBucket::Processed) => processed.push(summary),
            None => unrecognized.push(summary),
        }
    }

    OrdersOverview {
        groups: vec![
            StatusGroup::new(StatusBucket::New, new),
            StatusGroup::new(StatusBucket::InProgress, in_progress),
            StatusGroup::new(StatusBucket::Processed, processed),
        ],
        unrecognized,
        refresh_interval_seconds: refresh_interval.as_secs(),
        generated_at: Utc::now().to_rfc3339(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderInfo {
    pub id: i64,
    pub created_at: String,
    pub status: String,
    pub customer_email: Option<String>,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationDisplay {
    pub contact_person: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

impl From<&Location> for LocationDisplay {
    fn from(location: &Location) -> Self {
        Self {
            contact_person: display::text(location.contact_person.as_deref()),
            street: display::text(location.street.as_deref()),
            postal_code: display::text(location.postal_code.as_deref()),
            city: display::text(location.city.as_deref()),
            country: display::text(location.country.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GoodsItemDisplay {
    pub description: String,
    pub quantity: String,
    pub weight_kg: String,
}

impl From<&GoodsItem> for GoodsItemDisplay {
    fn from(item: &GoodsItem) -> Self {
        Self {
            description: display::text(item.description.as_deref()),
            quantity: display::number(item.quantity),
            weight_kg: display::number(item.weight_kg),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GoodsDisplay {
    pub heading: String,
    pub count: usize,
    pub items: Vec<GoodsItemDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_notice: Option<&'static str>,
}

impl GoodsDisplay {
    fn new(goods: &[GoodsItem]) -> Self {
        Self {
            heading: format!("PRODUCTEN ({})", goods.len()),
            count: goods.len(),
            items: goods.iter().map(GoodsItemDisplay::from).collect(),
            empty_notice: goods.is_empty().then_some(NO_GOODS_NOTICE),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentDisplay {
    pub debtor: String,
    pub subject: String,
    pub received_at: String,
    pub badge: BadgeVariant,
    pub transport_type: String,
    pub loading_date: String,
    pub window_start: String,
    pub window_end: String,
    pub loading: LocationDisplay,
    pub unloading: LocationDisplay,
    pub goods: GoodsDisplay,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailInfo {
    pub sender: String,
    pub subject: String,
    pub received_at: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttachmentNotice {
    Missing { message: &'static str },
    Restricted { url: String, message: &'static str },
}

/// What the left-hand pane of the order page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDocument {
    Pdf {
        url: String,
    },
    Email {
        email: EmailInfo,
        attachment: AttachmentNotice,
    },
}

impl SourceDocument {
    fn for_order(order: &Order) -> Self {
        let document_url = shipment::present(order.document_url.as_deref())
            .filter(|url| !url.trim().is_empty());
        let attachment = match document_url {
            Some(url) if !url.contains(RESTRICTED_DOCUMENT_HOST) => {
                return SourceDocument::Pdf {
                    url: url.to_string(),
                }
            }
            Some(url) => AttachmentNotice::Restricted {
                url: url.to_string(),
                message: RESTRICTED_PDF_NOTICE,
            },
            None => AttachmentNotice::Missing {
                message: NO_PDF_NOTICE,
            },
        };
        SourceDocument::Email {
            email: EmailInfo {
                sender: display::text(order.customer_email.as_deref()),
                subject: display::text(order.email_subject.as_deref()),
                received_at: display::timestamp(order.created_at),
                body: order.email_body.clone().filter(|body| !body.is_empty()),
            },
            attachment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: OrderInfo,
    pub bucket: Option<StatusBucket>,
    pub actions: AvailableActions,
    /// Normalized payload as stored.
    pub shipment_data: ShipmentData,
    /// Initial values for the edit form.
    pub form: ShipmentData,
    pub display: ShipmentDisplay,
    pub source: SourceDocument,
}

impl OrderDetail {
    pub fn from_order(order: &Order) -> Self {
        let data = shipment::normalize(order.order_data.as_ref());
        let transport = &data.transport;
        let display = ShipmentDisplay {
            debtor: display::debtor_from_email(order.customer_email.as_deref()),
            subject: shipment::present(order.email_subject.as_deref())
                .filter(|subject| !subject.is_empty())
                .unwrap_or(NO_SUBJECT)
                .to_string(),
            received_at: display::timestamp(order.created_at),
            badge: display::badge(&order.status),
            transport_type: display::text(transport.transport_type.as_deref()),
            loading_date: display::date(transport.loading_date.as_deref()),
            window_start: display::time(transport.window_start.as_deref()),
            window_end: display::time(transport.window_end.as_deref()),
            loading: LocationDisplay::from(&data.loading_location),
            unloading: LocationDisplay::from(&data.unloading_location),
            goods: GoodsDisplay::new(&data.goods),
        };

        Self {
            order: OrderInfo {
                id: order.id,
                created_at: display::rfc3339(order.created_at),
                status: order.status.clone(),
                customer_email: order.customer_email.clone(),
                email_subject: order.email_subject.clone(),
                email_body: order.email_body.clone(),
                document_url: order.document_url.clone(),
            },
            bucket: StatusBucket::of(&order.status),
            actions: AvailableActions::for_status(&order.status),
            form: data.editable(),
            shipment_data: data,
            display,
            source: SourceDocument::for_order(order),
        }
    }
}
