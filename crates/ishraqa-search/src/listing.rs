//! Display helpers for real-estate project hits (Arabic first, English fallback).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Geo, Hit};

/// Label shown when a bilingual field has no usable text
pub const UNSPECIFIED_LABEL: &str = "غير محدد";

/// Object storage root for project attachments
pub const ATTACHMENT_CDN: &str = "https://repm.ams3.digitaloceanspaces.com";

/// Riyadh city centre, the storefront's reference point
pub const RIYADH: Geo = Geo {
    lat: 24.7136,
    lng: 46.6753,
};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Resolve a bilingual value: `{ar, en}` object, plain string, or nothing.
pub fn localized(value: Option<&Value>) -> Option<&str> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.as_str()),
        Value::Object(obj) => ["ar", "en"].iter().find_map(|lang| {
            obj.get(*lang)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        }),
        _ => None,
    }
}

/// Sales/construction status of a project
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    UnderConstruction,
    SellingSoon,
    SoldOut,
    Unknown,
}

const STATUS_PATTERNS: &[(ProjectStatus, &[&str])] = &[
    (
        ProjectStatus::UnderConstruction,
        &["Under_Construction", "Under Construction", "قيد الإنشاء"],
    ),
    (
        ProjectStatus::SellingSoon,
        &["Soon_Sale", "Selling Soon", "قريباً البيع"],
    ),
    (
        ProjectStatus::SoldOut,
        &["Completed", "SOLD OUT", "مباع بالكامل"],
    ),
];

impl ProjectStatus {
    /// Classify a raw status value (`{code, ar, en}` object or plain string).
    pub fn classify(value: Option<&Value>) -> Self {
        let texts: Vec<&str> = match value {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Object(obj)) => ["code", "ar", "en"]
                .iter()
                .filter_map(|k| obj.get(*k).and_then(Value::as_str))
                .collect(),
            _ => Vec::new(),
        };

        STATUS_PATTERNS
            .iter()
            .find(|(_, patterns)| {
                texts
                    .iter()
                    .any(|text| patterns.iter().any(|p| text.contains(p)))
            })
            .map(|(status, _)| *status)
            .unwrap_or(ProjectStatus::Unknown)
    }

    /// Map marker colour
    pub fn marker_color(&self) -> &'static str {
        match self {
            ProjectStatus::UnderConstruction => "#dc2626",
            ProjectStatus::SellingSoon => "#d97706",
            ProjectStatus::SoldOut => "#16a34a",
            ProjectStatus::Unknown => "#3b82f6",
        }
    }
}

/// Great-circle distance in kilometres (haversine).
pub fn distance_km(from: Geo, to: Geo) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Resolve the display URL of an attachment record.
pub fn attachment_url(attachment: &Value, project_id: Option<&str>) -> Option<String> {
    let url = attachment.get("url").and_then(Value::as_str);

    if let Some(url) = url {
        if url.starts_with("http") {
            return Some(url.to_string());
        }
        if url.starts_with("projects/") {
            return Some(format!("{}/{}", ATTACHMENT_CDN, url));
        }
    }

    if let (Some(filename), Some(project_id)) = (
        attachment.get("filename").and_then(Value::as_str),
        project_id,
    ) {
        return Some(format!(
            "{}/projects/{}/{}",
            ATTACHMENT_CDN, project_id, filename
        ));
    }

    attachment
        .get("thumbnail")
        .and_then(Value::as_str)
        .or(url)
        .map(str::to_string)
}

impl Hit {
    pub fn title(&self) -> Option<&str> {
        self.field("name").and_then(Value::as_str)
    }

    pub fn status(&self) -> ProjectStatus {
        ProjectStatus::classify(self.field("status"))
    }

    pub fn status_label(&self) -> &str {
        localized(self.field("status")).unwrap_or(UNSPECIFIED_LABEL)
    }

    pub fn district_label(&self) -> &str {
        localized(self.field("district")).unwrap_or(UNSPECIFIED_LABEL)
    }

    /// Distance from `origin`, if the hit has coordinates
    pub fn distance_from(&self, origin: Geo) -> Option<f64> {
        self.geo.map(|geo| distance_km(origin, geo))
    }

    /// URL of the first attachment
    pub fn cover_image(&self) -> Option<String> {
        let first = self.field("attachments")?.as_array()?.first()?;
        let project_id = self.field("id").and_then(Value::as_str);
        attachment_url(first, project_id)
    }
}
