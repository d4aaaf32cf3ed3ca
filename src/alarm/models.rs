use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ShieldId = i64;

/// The kind of window a shield suppresses alerts in.
/// Unrecognised values from the backend are kept as `Unknown` instead of failing the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SuppressionKind {
    One,
    Week,
    Month,
    Unknown(String),
}

impl From<String> for SuppressionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "one" => SuppressionKind::One,
            "week" => SuppressionKind::Week,
            "month" => SuppressionKind::Month,
            _ => SuppressionKind::Unknown(value),
        }
    }
}

impl From<SuppressionKind> for String {
    fn from(kind: SuppressionKind) -> Self {
        match kind {
            SuppressionKind::One => "one".to_string(),
            SuppressionKind::Week => "week".to_string(),
            SuppressionKind::Month => "month".to_string(),
            SuppressionKind::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressionTime {
    #[serde(rename = "type")]
    pub kind: SuppressionKind,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    // Weekdays (1 = Monday .. 7 = Sunday) for `week`, days of month for `month`.
    #[serde(default)]
    pub week_month: Option<Vec<u32>>,
}

impl SuppressionTime {
    pub fn days(&self) -> &[u32] {
        self.week_month.as_deref().unwrap_or(&[])
    }
}

/// One row of the shield-strategy list, as returned by the alarm backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertShieldListItem {
    pub id: ShieldId,
    pub name: String,
    pub suppression_time: SuppressionTime,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    // match_type, match_rules, created_by, ... are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShieldPage {
    #[serde(default)]
    pub items: Vec<AlertShieldListItem>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShieldQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchShieldRequest {
    pub is_active: bool,
}

/// Body of the create/edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldForm {
    pub name: String,
    pub suppression_time: SuppressionTime,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: u32,
    pub total: u64,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            current: 1,
            total: 0,
            page_size: page_size.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_suppression_type_is_preserved() {
        let item: AlertShieldListItem = serde_json::from_value(json!({
            "id": 7,
            "name": "night",
            "suppression_time": { "type": "yearly", "start_time": "00:00:00", "end_time": "01:00:00" },
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "match_type": "all"
        }))
        .unwrap();

        assert_eq!(
            item.suppression_time.kind,
            SuppressionKind::Unknown("yearly".to_string())
        );
        assert!(item.suppression_time.days().is_empty());
        assert_eq!(item.extra.get("match_type"), Some(&json!("all")));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["suppression_time"]["type"], "yearly");
        assert_eq!(back["match_type"], "all");
    }

    #[test]
    fn test_null_week_month_reads_as_empty() {
        let st: SuppressionTime = serde_json::from_value(json!({
            "type": "week",
            "start_time": "08:00:00",
            "end_time": "09:00:00",
            "week_month": null
        }))
        .unwrap();
        assert_eq!(st.kind, SuppressionKind::Week);
        assert!(st.days().is_empty());
    }

    #[test]
    fn test_query_omits_empty_name() {
        let query = ShieldQuery { page: 2, page_size: 20, name: None };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "page": 2, "page_size": 20 })
        );
    }
}
