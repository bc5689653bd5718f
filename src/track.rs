//! # Track Records
//!
//! A [`Track`] is a JSON object supplied by the caller. Only `tags` and
//! `popularity` are interpreted; every other field is carried through
//! untouched, key order included, so playlists echo their input.
//!
//! Input is validated once by [`parse_tracks`] / [`Track::from_value`]:
//! absent fields take defaults, but fields that are present with the wrong
//! type are rejected rather than guessed at.

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use thiserror::Error;

pub const TAGS_FIELD: &str = "tags";
pub const POPULARITY_FIELD: &str = "popularity";

/// Malformed track input.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("track list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("track list must be a JSON array, got {0}")]
    NotAnArray(&'static str),
    #[error("track {index} must be a JSON object, got {found}")]
    NotAnObject { index: usize, found: &'static str },
    #[error("track {index}: `tags` must be an array, got {found}")]
    InvalidTags { index: usize, found: &'static str },
    #[error("track {index}: `popularity` must be a number or boolean, got {found}")]
    InvalidPopularity { index: usize, found: &'static str },
}

/// Sort key taken from `popularity`.
///
/// Integers compare exactly (up to `i128`), floats compare numerically, and
/// mixed pairs compare by value, so `70` and `70.0` are equal. Booleans rank
/// as 0 and 1.
#[derive(Debug, Clone, Copy)]
pub enum Popularity {
    Int(i128),
    Float(f64),
}

impl Popularity {
    pub const ZERO: Self = Self::Int(0);

    fn from_number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            Self::Int(i128::from(i))
        } else if let Some(u) = n.as_u64() {
            Self::Int(i128::from(u))
        } else if let Ok(i) = n.to_string().parse::<i128>() {
            Self::Int(i)
        } else {
            Self::Float(n.as_f64().unwrap_or(0.0))
        }
    }
}

impl Ord for Popularity {
    fn cmp(&self, other: &Self) -> Ordering {
        match (*self, *other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(&b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Self::Int(a), Self::Float(b)) => cmp_int_float(a, b),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(b, a).reverse(),
        }
    }
}

impl PartialOrd for Popularity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Popularity {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Popularity {}

/// Exact comparison of an integer against a float.
fn cmp_int_float(i: i128, f: f64) -> Ordering {
    // 2^127: every float at or past this bound lies outside i128.
    const BOUND: f64 = i128::MAX as f64;
    if f >= BOUND {
        return Ordering::Less;
    }
    if f < -BOUND {
        return Ordering::Greater;
    }
    i.cmp(&(f.trunc() as i128))
        .then_with(|| 0.0_f64.partial_cmp(&f.fract()).unwrap_or(Ordering::Equal))
}

/// One caller-supplied track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    fields: Map<String, Value>,
    popularity: Popularity,
}

impl Serialize for Track {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl Track {
    /// Validates the `index`-th entry of a track list.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::NotAnObject`], [`TrackError::InvalidTags`] or
    /// [`TrackError::InvalidPopularity`] when the entry has the wrong shape.
    pub fn from_value(index: usize, value: Value) -> Result<Self, TrackError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(TrackError::NotAnObject {
                    index,
                    found: json_type(&other),
                })
            }
        };

        match fields.get(TAGS_FIELD) {
            None | Some(Value::Array(_)) => {}
            Some(other) => {
                return Err(TrackError::InvalidTags {
                    index,
                    found: json_type(other),
                })
            }
        }

        let popularity = match fields.get(POPULARITY_FIELD) {
            None => Popularity::ZERO,
            Some(Value::Number(n)) => Popularity::from_number(n),
            Some(Value::Bool(b)) => Popularity::Int(i128::from(*b)),
            Some(other) => {
                return Err(TrackError::InvalidPopularity {
                    index,
                    found: json_type(other),
                })
            }
        };

        Ok(Self { fields, popularity })
    }

    /// Popularity score, 0 when absent.
    #[must_use]
    pub const fn popularity(&self) -> Popularity {
        self.popularity
    }

    /// String tags. Non-string entries are skipped.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.fields
            .get(TAGS_FIELD)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Exact, case-sensitive tag membership.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().any(|t| t == tag)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Parses a JSON array of track objects, failing on the first malformed entry.
///
/// # Errors
///
/// [`TrackError::Json`] for invalid JSON, otherwise whatever
/// [`tracks_from_value`] reports.
///
/// # Examples
///
/// ```
/// use moodtune::track::{parse_tracks, Popularity, TrackError};
///
/// let tracks = parse_tracks(r#"[{"name": "Sunny", "tags": ["Happy"]}]"#)?;
/// assert_eq!(tracks[0].popularity(), Popularity::ZERO);
///
/// assert!(matches!(parse_tracks(r#"[42]"#), Err(TrackError::NotAnObject { index: 0, .. })));
/// # Ok::<(), TrackError>(())
/// ```
pub fn parse_tracks(json: &str) -> Result<Vec<Track>, TrackError> {
    tracks_from_value(serde_json::from_str(json)?)
}

/// Validates an already decoded track list.
///
/// # Errors
///
/// [`TrackError::NotAnArray`] when `value` is not an array, or the first
/// per-entry error from [`Track::from_value`].
pub fn tracks_from_value(value: Value) -> Result<Vec<Track>, TrackError> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(index, value)| Track::from_value(index, value))
            .collect(),
        other => Err(TrackError::NotAnArray(json_type(&other))),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_take_defaults() {
        let track = Track::from_value(0, json!({"name": "Untagged"})).unwrap();
        assert_eq!(track.popularity(), Popularity::ZERO);
        assert_eq!(track.tags().count(), 0);
        assert!(!track.has_tag("Happy"));
    }

    #[test]
    fn test_tag_membership_is_exact() {
        let track = Track::from_value(0, json!({"tags": ["Happy", 4, "Calm"]})).unwrap();
        assert!(track.has_tag("Happy"));
        assert!(track.has_tag("Calm"));
        assert!(!track.has_tag("happy"));
        assert!(!track.has_tag("Hap"));
        assert_eq!(track.tags().collect::<Vec<_>>(), vec!["Happy", "Calm"]);
    }

    #[test]
    fn test_integer_and_float_popularity() {
        let popularity = |value: Value| Track::from_value(0, value).unwrap().popularity();

        assert_eq!(popularity(json!({"popularity": 70})), Popularity::Int(70));
        assert_eq!(popularity(json!({"popularity": 70.5})), Popularity::Float(70.5));
        assert_eq!(popularity(json!({"popularity": -3})), Popularity::Int(-3));
        assert_eq!(popularity(json!({"popularity": 70.0})), Popularity::Int(70));
    }

    #[test]
    fn test_boolean_popularity_ranks_as_zero_or_one() {
        let tracks = parse_tracks(r#"[{"popularity": true}, {"popularity": false}]"#).unwrap();
        assert_eq!(tracks[0].popularity(), Popularity::Int(1));
        assert_eq!(tracks[1].popularity(), Popularity::ZERO);
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let low = Popularity::Int(9_007_199_254_740_992);
        let high = Popularity::Int(9_007_199_254_740_993);
        assert!(high > low);

        let huge = parse_tracks(r#"[{"popularity": 100000000000000000001}, {"popularity": 100000000000000000000}]"#)
            .unwrap();
        assert!(huge[0].popularity() > huge[1].popularity());
    }

    #[test]
    fn test_mixed_integer_float_ordering() {
        assert!(Popularity::Int(2) > Popularity::Float(1.5));
        assert!(Popularity::Int(1) < Popularity::Float(1.5));
        assert!(Popularity::Int(-2) < Popularity::Float(-1.5));
        assert!(Popularity::Int(-1) > Popularity::Float(-1.5));
        assert!(Popularity::Int(i128::MAX) < Popularity::Float(1e300));
        assert!(Popularity::Int(i128::MIN) > Popularity::Float(-1e300));
        assert_eq!(Popularity::Float(0.0), Popularity::Float(-0.0));
    }

    #[test]
    fn test_big_integer_popularity_is_echoed_verbatim() {
        let input = r#"{"tags":["Happy"],"popularity":100000000000000000000}"#;
        let tracks = parse_tracks(&format!("[{input}]")).unwrap();

        assert_eq!(serde_json::to_string(&tracks[0]).unwrap(), input);
    }

    #[test]
    fn test_parse_preserves_fields_and_order() {
        let input = r#"[{"name":"A","tags":["Happy"],"popularity":5,"extra":{"z":1,"a":2}}]"#;
        let tracks = parse_tracks(input).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(serde_json::to_string(&tracks[0]).unwrap(), &input[1..input.len() - 1]);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(matches!(parse_tracks("[{"), Err(TrackError::Json(_))));
        assert!(matches!(parse_tracks(r#"{"tags": []}"#), Err(TrackError::NotAnArray("an object"))));
        assert!(matches!(
            parse_tracks(r#"[{"tags": []}, "Happy"]"#),
            Err(TrackError::NotAnObject { index: 1, .. })
        ));
        assert!(matches!(
            parse_tracks(r#"[{"tags": "Happy"}]"#),
            Err(TrackError::InvalidTags { index: 0, found: "a string" })
        ));
        assert!(matches!(
            parse_tracks(r#"[{"tags": null}]"#),
            Err(TrackError::InvalidTags { found: "null", .. })
        ));
        assert!(matches!(
            parse_tracks(r#"[{"popularity": "high"}]"#),
            Err(TrackError::InvalidPopularity { index: 0, .. })
        ));
        assert!(matches!(
            parse_tracks(r#"[{"popularity": null}]"#),
            Err(TrackError::InvalidPopularity { found: "null", .. })
        ));
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_tracks("[]").unwrap().is_empty());
    }
}
