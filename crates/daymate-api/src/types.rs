//! Wire types for the DayMate backend.
//!
//! Weather and news payloads are owned by the backend and kept as raw JSON;
//! everything the client reasons about is typed.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A location persisted server-side for the authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of `POST /api/locations`.
#[derive(Debug, Clone, Serialize)]
pub struct NewLocation {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Weather snapshot exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherSnapshot(pub serde_json::Value);

/// News snapshot exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsSnapshot(pub serde_json::Value);

/// A single headline pulled out of a [`NewsSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub title: String,
    pub url: Option<String>,
}

impl NewsSnapshot {
    /// Headlines from the `articles` array, in backend order.
    pub fn headlines(&self) -> Vec<Headline> {
        self.0
            .get("articles")
            .and_then(|a| a.as_array())
            .map(|articles| {
                articles
                    .iter()
                    .filter_map(|article| {
                        let title = article.get("title")?.as_str()?.to_string();
                        let url = article
                            .get("url")
                            .and_then(|u| u.as_str())
                            .map(str::to_string);
                        Some(Headline { title, url })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_articles(&self) -> bool {
        self.0.get("articles").map_or(false, |a| a.is_array())
    }
}

/// AI-generated daily plan. Every field is optional; an absent field means
/// the corresponding section is not shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Body of `POST /api/plan`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanRequest {
    pub lat: f64,
    pub lon: f64,
    pub location_name: String,
    pub preferences: serde_json::Map<String, serde_json::Value>,
}

/// Response of `POST /api/plan`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanEnvelope {
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanHistoryEntry {
    pub id: String,
    #[serde(default)]
    pub location_name: String,
    pub created_at: String,
    #[serde(default)]
    pub plan: Plan,
}

impl PlanHistoryEntry {
    /// Creation time, accepting both RFC 3339 and naive ISO timestamps (UTC).
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanHistoryResponse {
    #[serde(default)]
    pub plans: Vec<PlanHistoryEntry>,
}
