//! Lottery entries and incoming point submissions.

use serde::{Deserialize, Deserializer, Serialize};

/// Largest point total a single submission may carry, either sign.
pub const MAX_SUBMITTED_POINTS: i64 = 1_000_000_000_000;

/// A participant's point total for one season.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "mysql", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct LotteryEntry {
    #[cfg_attr(feature = "mysql", sqlx(rename = "userName"))]
    pub user_name: String,
    pub season: String,
    pub points: i64,
}

impl LotteryEntry {
    pub fn new(user_name: impl Into<String>, season: impl Into<String>, points: i64) -> Self {
        Self {
            user_name: user_name.into(),
            season: season.into(),
            points,
        }
    }

    /// Draw weight; negative totals never count.
    pub fn weight(&self) -> u64 {
        self.points.max(0).unsigned_abs()
    }
}

/// A signed point submission sent by the client.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PointSubmission {
    /// Token identifying the sender
    #[serde(default)]
    pub jwt: Option<String>,

    #[serde(deserialize_with = "season_key")]
    pub season: String,

    #[serde(deserialize_with = "whole_points")]
    pub points: i64,
}

impl PointSubmission {
    /// Turn the submission into a table row for an authenticated user.
    pub fn into_entry(self, user_name: String) -> LotteryEntry {
        LotteryEntry {
            user_name,
            season: self.season,
            points: self.points,
        }
    }
}

/// Body of a queued message: either one submission or a batch of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SubmissionBody {
    Many(Vec<PointSubmission>),
    One(PointSubmission),
}

impl SubmissionBody {
    pub fn into_vec(self) -> Vec<PointSubmission> {
        match self {
            SubmissionBody::Many(submissions) => submissions,
            SubmissionBody::One(submission) => vec![submission],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeasonRepr {
    Text(String),
    Number(i64),
}

/// Seasons arrive either as `"12"` or `12`.
fn season_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match SeasonRepr::deserialize(deserializer)? {
        SeasonRepr::Text(text) => text,
        SeasonRepr::Number(number) => number.to_string(),
    })
}

fn whole_points<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("points must be finite"));
    }
    let rounded = value.round();
    if rounded.abs() > MAX_SUBMITTED_POINTS as f64 {
        return Err(serde::de::Error::custom(format!(
            "points {value} outside ±{MAX_SUBMITTED_POINTS}"
        )));
    }
    Ok(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_uses_camel_case() {
        let entry = LotteryEntry::new("alice", "12", 40);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"userName":"alice","season":"12","points":40}"#);
    }

    #[test]
    fn negative_points_weigh_nothing() {
        assert_eq!(LotteryEntry::new("bob", "1", -3).weight(), 0);
        assert_eq!(LotteryEntry::new("bob", "1", 3).weight(), 3);
    }

    #[test]
    fn submission_accepts_numeric_season_and_fractional_points() {
        let submission: PointSubmission =
            serde_json::from_str(r#"{"jwt": "t", "season": 12, "points": 41.6}"#).unwrap();

        assert_eq!(submission.season, "12");
        assert_eq!(submission.points, 42);
        assert_eq!(submission.jwt.as_deref(), Some("t"));
    }

    #[test]
    fn submission_rejects_out_of_range_points() {
        for points in ["1e300", "-1e300", "1000000000001"] {
            let json = format!(r#"{{"jwt": "t", "season": "3", "points": {points}}}"#);
            assert!(serde_json::from_str::<PointSubmission>(&json).is_err(), "{points}");
        }

        let json = format!(r#"{{"jwt": "t", "season": "3", "points": {MAX_SUBMITTED_POINTS}}}"#);
        let submission: PointSubmission = serde_json::from_str(&json).unwrap();
        assert_eq!(submission.points, MAX_SUBMITTED_POINTS);
    }

    #[test]
    fn body_holds_one_or_many() {
        let one: SubmissionBody =
            serde_json::from_str(r#"{"season": "3", "points": 5}"#).unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: SubmissionBody = serde_json::from_str(
            r#"[{"jwt": "a", "season": "3", "points": 5}, {"jwt": "b", "season": "3", "points": 7}]"#,
        )
        .unwrap();
        let many = many.into_vec();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].points, 7);
    }
}
