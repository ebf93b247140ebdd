use crate::model::newsletter::Newsletter;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The counter a badge ranks newsletters by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeType {
    #[display("LIKE")]
    Like,
    #[display("YOU_ROCK")]
    YouRock,
}

impl BadgeType {
    pub const ALL: [BadgeType; 2] = [BadgeType::Like, BadgeType::YouRock];

    pub fn column(&self) -> &'static str {
        match self {
            BadgeType::Like => "likes_count",
            BadgeType::YouRock => "you_rocks_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeCategory {
    #[display("DAY")]
    Day,
    #[display("WEEK")]
    Week,
    #[display("MONTH")]
    Month,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 3] = [BadgeCategory::Day, BadgeCategory::Week, BadgeCategory::Month];

    /// Start of the window this category covers at `now`, in UTC.
    ///
    /// DAY starts at today's midnight, WEEK at midnight seven days ago and
    /// MONTH at midnight on the first of the month. Every window ends at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let date = match self {
            BadgeCategory::Day => today,
            BadgeCategory::Week => today - Duration::days(7),
            BadgeCategory::Month => today.with_day(1).unwrap_or(today),
        };
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeRank {
    #[display("FIRST")]
    First,
    #[display("SECOND")]
    Second,
    #[display("THIRD")]
    Third,
}

impl BadgeRank {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(BadgeRank::First),
            1 => Some(BadgeRank::Second),
            2 => Some(BadgeRank::Third),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Badge {
    pub id: i64,
    pub newsletter_id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub badge_type: BadgeType,
    pub category: BadgeCategory,
    pub rank: BadgeRank,
    pub count: i64,
    pub period_start: i64,
    pub earned_at: i64,
}

#[derive(Debug, Serialize)]
pub struct BadgeWithNewsletter {
    #[serde(flatten)]
    pub badge: Badge,
    pub newsletter: Newsletter,
}

/// A newsletter that made the top three for a window, before it is stored.
#[derive(Debug, Clone, FromRow)]
pub struct RankedNewsletter {
    pub id: i64,
    pub metric: i64,
}

#[derive(Debug, Deserialize)]
pub struct BadgeQuery {
    #[serde(rename = "type")]
    pub badge_type: BadgeType,
    pub category: BadgeCategory,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CalculatedBadges {
    pub day: Vec<Badge>,
    pub week: Vec<Badge>,
    pub month: Vec<Badge>,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub success: bool,
    pub badges: CalculatedBadges,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<BadgeCategory>,
}
