//! Shipment payload stored in `orders.order_data`.
//!
//! The upstream extraction step writes this column in several shapes: a JSON
//! object, a JSON string holding the object (sometimes wrapped in a Markdown
//! code fence), partial objects, or objects with the literal string `"NULL"`
//! where a value is missing. [`normalize`] is the single boundary that turns
//! any of those into a [`ShipmentData`]; nothing past it checks for the
//! sentinel again.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::utils::json::{form_number, form_text};

/// Placeholder the upstream producer writes instead of leaving a value out.
pub const NULL_SENTINEL: &str = "NULL";

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").expect("valid opening fence"));
static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?```\s*$").expect("valid closing fence"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentData {
    #[serde(rename = "laad_locatie", default, deserialize_with = "lenient")]
    pub loading_location: Location,
    #[serde(rename = "los_locatie", default, deserialize_with = "lenient")]
    pub unloading_location: Location,
    #[serde(rename = "transport_details", default, deserialize_with = "lenient")]
    pub transport: TransportDetails,
    #[serde(rename = "goederen", default, deserialize_with = "lenient_goods")]
    pub goods: Vec<GoodsItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "straat", default, deserialize_with = "lenient_text")]
    pub street: Option<String>,
    #[serde(rename = "postcode", default, deserialize_with = "lenient_text")]
    pub postal_code: Option<String>,
    #[serde(rename = "plaats", default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(rename = "land", default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(rename = "contactpersoon", default, deserialize_with = "lenient_text")]
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportDetails {
    /// Expected as `YYYY-MM-DD`; kept as text because upstream does not always comply.
    #[serde(rename = "datum_laden", default, deserialize_with = "lenient_text")]
    pub loading_date: Option<String>,
    #[serde(rename = "tijd_van", default, deserialize_with = "lenient_text")]
    pub window_start: Option<String>,
    #[serde(rename = "tijd_tot", default, deserialize_with = "lenient_text")]
    pub window_end: Option<String>,
    #[serde(rename = "transport_type", default, deserialize_with = "lenient_text")]
    pub transport_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodsItem {
    #[serde(rename = "omschrijving", default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(rename = "aantal", default, deserialize_with = "lenient_number")]
    pub quantity: Option<f64>,
    #[serde(rename = "gewicht_kg", default, deserialize_with = "lenient_number")]
    pub weight_kg: Option<f64>,
}

impl ShipmentData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy used to seed the edit form: the goods list always has at least one row.
    pub fn editable(&self) -> Self {
        let mut form = self.clone();
        if form.goods.is_empty() {
            form.goods.push(GoodsItem::default());
        }
        form
    }

    /// Parses a submitted edit form. Text inputs that are empty become null,
    /// numeric inputs that are empty become null and anything else must parse
    /// as a number.
    pub fn from_form(form: &Value) -> Result<Self, String> {
        let form = form
            .as_object()
            .ok_or_else(|| "order_data must be an object".to_string())?;

        let goods = match form.get("goederen") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| GoodsItem::from_form(index, item))
                .collect::<Result<_, _>>()?,
            Some(other) => return Err(format!("goederen must be a list, got {other}")),
        };

        Ok(Self {
            loading_location: Location::from_form("laad_locatie", form.get("laad_locatie"))?,
            unloading_location: Location::from_form("los_locatie", form.get("los_locatie"))?,
            transport: TransportDetails::from_form(form.get("transport_details"))?,
            goods,
        })
    }

    /// Payload as written back to `orders.order_data`.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

impl Location {
    fn from_form(section: &str, value: Option<&Value>) -> Result<Self, String> {
        let Some(fields) = form_section(section, value)? else {
            return Ok(Self::default());
        };
        Ok(Self {
            street: form_text("straat", fields.get("straat"))?,
            postal_code: form_text("postcode", fields.get("postcode"))?,
            city: form_text("plaats", fields.get("plaats"))?,
            country: form_text("land", fields.get("land"))?,
            contact_person: form_text("contactpersoon", fields.get("contactpersoon"))?,
        })
    }
}

impl TransportDetails {
    fn from_form(value: Option<&Value>) -> Result<Self, String> {
        let Some(fields) = form_section("transport_details", value)? else {
            return Ok(Self::default());
        };
        Ok(Self {
            loading_date: form_text("datum_laden", fields.get("datum_laden"))?,
            window_start: form_text("tijd_van", fields.get("tijd_van"))?,
            window_end: form_text("tijd_tot", fields.get("tijd_tot"))?,
            transport_type: form_text("transport_type", fields.get("transport_type"))?,
        })
    }
}

impl GoodsItem {
    fn from_form(index: usize, value: &Value) -> Result<Self, String> {
        let fields = value
            .as_object()
            .ok_or_else(|| format!("goederen[{index}] must be an object"))?;
        Ok(Self {
            description: form_text("omschrijving", fields.get("omschrijving"))?,
            quantity: form_number("aantal", fields.get("aantal"))?,
            weight_kg: form_number("gewicht_kg", fields.get("gewicht_kg"))?,
        })
    }
}

fn form_section<'a>(
    section: &str,
    value: Option<&'a Value>,
) -> Result<Option<&'a Map<String, Value>>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) => Ok(Some(fields)),
        Some(other) => Err(format!("{section} must be an object, got {other}")),
    }
}

/// `None` for missing values and for the upstream `"NULL"` sentinel.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|text| *text != NULL_SENTINEL)
}

/// Shape of a raw `order_data` value before it is turned into [`ShipmentData`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Missing,
    Object(Map<String, Value>),
    /// Text that did not decode to JSON, with the decoder message.
    Malformed(String),
    /// Decoded fine but is not an object, e.g. a number or a list.
    Unsupported(&'static str),
}

impl RawPayload {
    pub fn inspect(raw: Option<&Value>) -> Self {
        match raw {
            None | Some(Value::Null) => RawPayload::Missing,
            Some(Value::Object(map)) => RawPayload::Object(map.clone()),
            Some(Value::String(text)) => match serde_json::from_str::<Value>(strip_code_fence(text)) {
                Ok(Value::Object(map)) => RawPayload::Object(map),
                Ok(Value::Null) => RawPayload::Missing,
                Ok(other) => RawPayload::Unsupported(kind_of(&other)),
                Err(err) => RawPayload::Malformed(err.to_string()),
            },
            Some(other) => RawPayload::Unsupported(kind_of(other)),
        }
    }
}

/// Turns a raw `order_data` column into shipment data. Never fails: input that
/// cannot be decoded yields an empty record so the order still renders.
pub fn normalize(raw: Option<&Value>) -> ShipmentData {
    match RawPayload::inspect(raw) {
        RawPayload::Missing => ShipmentData::default(),
        RawPayload::Object(map) => {
            ShipmentData::deserialize(Value::Object(map)).unwrap_or_else(|err| {
                warn!(error = %err, "order_data object did not match the shipment layout");
                ShipmentData::default()
            })
        }
        RawPayload::Malformed(error) => {
            warn!(%error, "failed to decode order_data text");
            ShipmentData::default()
        }
        RawPayload::Unsupported(kind) => {
            warn!(kind, "ignoring order_data that is not an object");
            ShipmentData::default()
        }
    }
}

/// Removes a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
/// Text that does not start with a fence is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = OPENING_FENCE
        .find(trimmed)
        .map(|found| &trimmed[found.end()..])
        .unwrap_or(trimmed);
    CLOSING_FENCE
        .find(body)
        .map(|found| &body[..found.start()])
        .unwrap_or(body)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_goods<'de, D>(deserializer: D) -> Result<Vec<GoodsItem>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter(Value::is_object)
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => present(Some(text.as_str())).map(str::to_owned),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => present(Some(text.trim()))
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|number| number.is_finite()),
        _ => None,
    })
}
