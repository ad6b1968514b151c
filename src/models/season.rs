//! Season data structures.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Points awarded for one unit of a stat during a season.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LotteryStat {
    /// Category tag (e.g. `totalResourcesUsed`)
    #[serde(rename = "type")]
    pub stat_type: String,

    /// Points per unit, already rounded to the configured step
    pub points: f64,
}

/// A fixed-length competitive period with its own point rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,

    pub season_name: String,

    /// First day of the season (`YYYY-MM-DD`). Placeholder seasons such as
    /// `{"date": "default"}` have none.
    #[serde(
        alias = "date",
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,

    #[serde(default = "default_duration")]
    pub duration_in_days: u32,

    pub resource_stat: LotteryStat,
    pub constructed_stat: LotteryStat,
    pub battlegrounds_stat: LotteryStat,
}

fn default_duration() -> u32 {
    14
}

/// Ids are numbers, but older documents may carry them as strings.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let id = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| serde::de::Error::custom(format!("invalid season id {value}")))
}

/// Anything that is not a `YYYY-MM-DD` string becomes `None`.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| s.trim().parse().ok()))
}

impl Season {
    /// Start of the season as an instant (midnight UTC).
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Identifier used as the `season` key in the lottery table.
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Pick the season whose entries should be drawn at `now`.
///
/// Seasons that already started are ordered most recent first; the first
/// one is still running, so the next one is the most recently completed.
/// Falls back to the first dated season of the document. Seasons without a
/// start date are never drawn.
pub fn season_to_draw(seasons: &[Season], now: DateTime<Utc>) -> Option<&Season> {
    let dated = || seasons.iter().filter(|s| s.start_date.is_some());
    let mut started: Vec<&Season> = dated()
        .filter(|s| s.starts_at().is_some_and(|start| start < now))
        .collect();
    started.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    started.get(1).copied().or_else(|| dated().next())
}

#[cfg(test)]
pub(crate) fn sample_season(id: i64, start: &str) -> Season {
    Season {
        id,
        season_name: format!("Season {id}"),
        start_date: Some(start.parse().unwrap()),
        duration_in_days: 14,
        resource_stat: LotteryStat {
            stat_type: "totalResourcesUsed".into(),
            points: 0.1,
        },
        constructed_stat: LotteryStat {
            stat_type: "spellsPlayed".into(),
            points: 1.0,
        },
        battlegrounds_stat: LotteryStat {
            stat_type: "quilboarsPlayed".into(),
            points: 1.0,
        },
    }
}
