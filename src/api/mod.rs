use std::future::Future;

use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

pub mod client;
pub mod csrf;
pub mod request;

pub use client::ApiClient;

/// Reply shape shared by every mutating endpoint: `{success, message|error}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroceryItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub items: Vec<GroceryItem>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerNotification {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub notifications: Vec<ServerNotification>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AnalyticsSnapshot {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub expiring_week: u64,
    #[serde(default)]
    pub expiring_today: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsReply {
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    MarkPurchased,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickEditBody {
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkBody {
    pub action: BulkAction,
    pub item_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickSettingBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

/// Every state-mutating request the client can issue.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    QuickEdit { item_id: String, body: QuickEditBody },
    MarkPurchased { item_id: String },
    QuickDelete { item_id: String },
    AddToShoppingList { item_id: String },
    Bulk(BulkBody),
    ExtendSession,
    QuickSetting(QuickSettingBody),
}

impl ApiCall {
    pub fn method(&self) -> Method {
        match self {
            ApiCall::QuickDelete { .. } => Method::DELETE,
            _ => Method::POST,
        }
    }

    /// Path segments below the base URL; the trailing empty segment keeps Django's slash.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            ApiCall::QuickEdit { item_id, .. } => vec!["api", "quick-edit", item_id, ""],
            ApiCall::MarkPurchased { item_id } => vec!["api", "mark-purchased", item_id, ""],
            ApiCall::QuickDelete { item_id } => vec!["api", "quick-delete", item_id, ""],
            ApiCall::AddToShoppingList { item_id } => {
                vec!["api", "add-to-shopping-list", item_id, ""]
            }
            ApiCall::Bulk(_) => vec!["api", "bulk-actions", ""],
            ApiCall::ExtendSession => vec!["accounts", "api", "extend-session", ""],
            ApiCall::QuickSetting(_) => vec!["accounts", "api", "quick-settings", ""],
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            ApiCall::QuickEdit { body, .. } => serde_json::to_value(body).ok(),
            ApiCall::Bulk(body) => serde_json::to_value(body).ok(),
            ApiCall::QuickSetting(body) => serde_json::to_value(body).ok(),
            _ => None,
        }
    }
}

/// Seam between the UI controllers and the HTTP client.
pub trait GroceryApi {
    fn send(&self, call: &ApiCall) -> impl Future<Output = Result<ActionReply>> + Send;
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_paths_match_endpoints() {
        let edit = ApiCall::QuickEdit {
            item_id: "42".to_string(),
            body: QuickEditBody {
                quantity: 3,
                notes: None,
            },
        };
        assert_eq!(edit.path(), "/api/quick-edit/42/");
        assert_eq!(edit.method(), Method::POST);
        assert_eq!(edit.body(), Some(json!({ "quantity": 3 })));

        let delete = ApiCall::QuickDelete {
            item_id: "42".to_string(),
        };
        assert_eq!(delete.path(), "/api/quick-delete/42/");
        assert_eq!(delete.method(), Method::DELETE);
        assert_eq!(delete.body(), None);

        assert_eq!(ApiCall::ExtendSession.path(), "/accounts/api/extend-session/");
    }

    #[test]
    fn bulk_body_uses_snake_case_action() {
        let call = ApiCall::Bulk(BulkBody {
            action: BulkAction::MarkPurchased,
            item_ids: vec!["a".to_string(), "b".to_string()],
        });
        assert_eq!(
            call.body(),
            Some(json!({ "action": "mark_purchased", "item_ids": ["a", "b"] }))
        );
    }

    #[test]
    fn items_accept_numeric_and_string_ids() {
        let reply: SearchReply = serde_json::from_value(json!({
            "success": true,
            "items": [
                { "id": 7, "name": "Milk", "category": "dairy", "quantity": 2, "unit": "l" },
                { "id": "65f0c", "name": "Bread", "price": 2.5, "expiry_date": "2026-10-21" }
            ]
        }))
        .expect("search reply parses");

        assert_eq!(reply.items[0].id, "7");
        assert_eq!(reply.items[1].id, "65f0c");
        assert_eq!(reply.items[1].price, Some(2.5));
        assert_eq!(reply.items[1].unit, "");
    }

    #[test]
    fn analytics_reply_flattens_counts() {
        let reply: AnalyticsReply = serde_json::from_value(json!({
            "success": true,
            "total_items": 12,
            "expiring_week": 3,
            "expiring_today": 1,
            "category_stats": {}
        }))
        .expect("analytics parses");
        assert_eq!(reply.snapshot.total_items, 12);
        assert_eq!(reply.snapshot.expiring_week, 3);
    }
}
