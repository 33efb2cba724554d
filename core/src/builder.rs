//! Pure request-body shaping: notifications, filter conditions, zone defaults.
//!
//! Nothing in here performs I/O; the client calls these right before it wraps
//! the result in a request envelope.

use serde_json::{Map, Value};

use crate::types::{Condition, Content, Notification, Operator, ZoneSpec};

/// `send_date` value that asks the API to push immediately.
pub const SEND_NOW: &str = "now";

pub const DEFAULT_ZONE_NAME: &str = "geozone";
pub const DEFAULT_ZONE_RANGE: u32 = 1000;
pub const DEFAULT_ZONE_COOLDOWN: u64 = 60;

/// Build a notification with `content` and `send_date = "now"`.
///
/// When `filters` is given, one condition per entry is attached under
/// `conditions`. Every `params` entry is then written at the top level.
///
/// Params are merged last and win over everything, `content` and
/// `send_date` included. A stray `"content"` key in `params` silently
/// replaces the content argument.
pub fn build_notification(
    content: &Content,
    filters: Option<&Map<String, Value>>,
    params: Option<&Map<String, Value>>,
) -> Notification {
    let mut notification = Notification::new();
    notification.insert("content", content_value(content));
    notification.insert("send_date", Value::String(SEND_NOW.to_string()));

    if let Some(filters) = filters {
        let conditions = derive_conditions(filters)
            .iter()
            .map(condition_value)
            .collect();
        notification.insert("conditions", Value::Array(conditions));
    }

    if let Some(params) = params {
        for (key, value) in params {
            notification.insert(key.clone(), value.clone());
        }
    }

    notification
}

/// Turn a filter mapping into conditions, `IN` for arrays and `EQ` otherwise.
///
/// Order follows the mapping's iteration order; duplicates are not merged.
pub fn derive_conditions(filters: &Map<String, Value>) -> Vec<Condition> {
    filters
        .iter()
        .map(|(field, value)| Condition {
            field: field.clone(),
            operator: if value.is_array() { Operator::In } else { Operator::Eq },
            value: value.clone(),
        })
        .collect()
}

/// Fill `name`, `range` and `cooldown` when the caller left them out.
pub fn apply_zone_defaults(mut zone: ZoneSpec) -> ZoneSpec {
    if zone.name.is_none() {
        zone.name = Some(DEFAULT_ZONE_NAME.to_string());
    }
    zone.range = zone.range.or(Some(DEFAULT_ZONE_RANGE));
    zone.cooldown = zone.cooldown.or(Some(DEFAULT_ZONE_COOLDOWN));
    zone
}

fn content_value(content: &Content) -> Value {
    match content {
        Content::Text(text) => Value::String(text.clone()),
        Content::Localized(map) => Value::Object(
            map.iter()
                .map(|(lang, text)| (lang.clone(), Value::String(text.clone())))
                .collect(),
        ),
    }
}

fn condition_value(condition: &Condition) -> Value {
    Value::Array(vec![
        Value::String(condition.field.clone()),
        Value::String(condition.operator.as_str().to_string()),
        condition.value.clone(),
    ])
}
