use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::Serialize;

use super::models::{AlertShieldListItem, ShieldId, SuppressionKind, SuppressionTime};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub title: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_index: Option<String>,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCell {
    pub label: String,
    pub effective: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchCell {
    pub checked: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCell {
    pub action: RowAction,
    pub label: String,
    pub permission: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldRowView {
    pub id: ShieldId,
    pub name: String,
    pub time_range: String,
    pub status: StatusCell,
    pub created_at: String,
    pub switch: SwitchCell,
    pub actions: Vec<ActionCell>,
}

/// Static page text: the intro banner, the search box, the add button and
/// the labels of the delete confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChrome {
    pub title: String,
    pub message: String,
    pub search_placeholder: String,
    pub add_label: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

pub fn build_chrome(locale: &str) -> PageChrome {
    PageChrome {
        title: t!("settings.shieldStrategy", locale = locale).to_string(),
        message: t!("settings.shieldStrategyMessage", locale = locale).to_string(),
        search_placeholder: t!("common.searchPlaceHolder", locale = locale).to_string(),
        add_label: t!("common.addNew", locale = locale).to_string(),
        confirm_label: t!("confirm", locale = locale).to_string(),
        cancel_label: t!("cancel", locale = locale).to_string(),
    }
}

/// Renders backend timestamps in the console's display offset.
#[derive(Debug, Clone, Copy)]
pub struct LocalizedTimeFormatter {
    offset: FixedOffset,
}

impl Default for LocalizedTimeFormatter {
    fn default() -> Self {
        Self { offset: Utc.fix() }
    }
}

impl LocalizedTimeFormatter {
    /// Offsets outside ±24h fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        match FixedOffset::east_opt(minutes.saturating_mul(60)) {
            Some(offset) => Self { offset },
            None => Self::default(),
        }
    }

    /// `pattern` uses the console's day.js tokens (`YYYY-MM-DD HH:mm:ss`).
    /// Values that are not RFC 3339 timestamps are returned unchanged.
    pub fn format(&self, value: &str, pattern: &str) -> String {
        match DateTime::parse_from_rfc3339(value) {
            Ok(parsed) => parsed
                .with_timezone(&self.offset)
                .format(&dayjs_to_chrono(pattern))
                .to_string(),
            Err(_) => value.to_string(),
        }
    }
}

fn dayjs_to_chrono(pattern: &str) -> String {
    pattern
        .replace("YYYY", "%Y")
        .replace("MM", "%m")
        .replace("DD", "%d")
        .replace("HH", "%H")
        .replace("mm", "%M")
        .replace("ss", "%S")
}

fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn format_date_time(value: &str) -> String {
    parse_date_time(value)
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

fn format_time(value: &str) -> String {
    let trimmed = value.trim();
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .or_else(|| parse_date_time(trimmed).map(|dt| dt.time()))
        .map(|time| time.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Weekday name for 1 (Monday) ..= 7 (Sunday); 0 is also Sunday.
/// Anything else has no name and renders as empty text.
pub fn weekday_name(day: u32, locale: &str) -> String {
    let name = match day {
        1 => t!("settings.weekday.mon", locale = locale),
        2 => t!("settings.weekday.tue", locale = locale),
        3 => t!("settings.weekday.wed", locale = locale),
        4 => t!("settings.weekday.thu", locale = locale),
        5 => t!("settings.weekday.fri", locale = locale),
        6 => t!("settings.weekday.sat", locale = locale),
        0 | 7 => t!("settings.weekday.sun", locale = locale),
        _ => return String::new(),
    };
    name.to_string()
}

pub fn type_label(kind: &SuppressionKind, locale: &str) -> String {
    match kind {
        SuppressionKind::One => t!("settings.typeLabel.one", locale = locale).to_string(),
        SuppressionKind::Week => t!("settings.typeLabel.week", locale = locale).to_string(),
        SuppressionKind::Month => t!("settings.typeLabel.month", locale = locale).to_string(),
        SuppressionKind::Unknown(_) => String::new(),
    }
}

/// Text of the time-range column.
pub fn render_time_range(suppression: &SuppressionTime, locale: &str) -> String {
    let mut label = type_label(&suppression.kind, locale);

    match &suppression.kind {
        SuppressionKind::One => {
            return format!(
                "{}-{}",
                format_date_time(&suppression.start_time),
                format_date_time(&suppression.end_time)
            );
        }
        SuppressionKind::Week => {
            let days: Vec<String> = suppression
                .days()
                .iter()
                .map(|day| weekday_name(*day, locale))
                .collect();
            label.push(' ');
            label.push_str(&days.join(","));
        }
        SuppressionKind::Month => {
            let days: Vec<String> = suppression.days().iter().map(|day| format!("{day}日")).collect();
            label.push(' ');
            label.push_str(&days.join(","));
        }
        SuppressionKind::Unknown(_) => {}
    }

    format!(
        "{} {} - {}",
        label,
        format_time(&suppression.start_time),
        format_time(&suppression.end_time)
    )
}

pub fn build_columns(locale: &str) -> Vec<ColumnDef> {
    let column = |title: String, key: &str, data_index: Option<&str>, width: u32| ColumnDef {
        title,
        key: key.to_string(),
        data_index: data_index.map(str::to_string),
        width,
    };

    vec![
        column(t!("settings.assignName", locale = locale).to_string(), "name", Some("name"), 150),
        column(t!("settings.assignTime", locale = locale).to_string(), "suppression_time", None, 220),
        column(t!("settings.assignStatus", locale = locale).to_string(), "assignStatus", Some("assignStatus"), 100),
        column(t!("settings.assignCreateTime", locale = locale).to_string(), "created_at", Some("created_at"), 180),
        column(t!("settings.assignStartStop", locale = locale).to_string(), "is_active", Some("is_active"), 110),
        column(t!("settings.assignActions", locale = locale).to_string(), "operation", None, 130),
    ]
}

pub fn build_row(
    item: &AlertShieldListItem,
    locale: &str,
    busy: bool,
    time_formatter: &LocalizedTimeFormatter,
) -> ShieldRowView {
    let status_label = if item.is_active {
        t!("settings.effective", locale = locale)
    } else {
        t!("settings.ineffective", locale = locale)
    };

    ShieldRowView {
        id: item.id,
        name: item.name.clone(),
        time_range: render_time_range(&item.suppression_time, locale),
        status: StatusCell {
            label: status_label.to_string(),
            effective: item.is_active,
        },
        created_at: time_formatter.format(&item.created_at, "YYYY-MM-DD HH:mm:ss"),
        switch: SwitchCell {
            checked: item.is_active,
            loading: busy,
        },
        actions: vec![
            ActionCell {
                action: RowAction::Edit,
                label: t!("edit", locale = locale).to_string(),
                permission: "Edit",
            },
            ActionCell {
                action: RowAction::Delete,
                label: t!("delete", locale = locale).to_string(),
                permission: "Delete",
            },
        ],
    }
}
