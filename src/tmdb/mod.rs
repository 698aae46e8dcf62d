//! TMDb data access: record types, cast/credit filtering and the HTTP client.
//!
//! The crawler only depends on [`CreditsSource`]; [`TmdbClient`] is the
//! network-backed implementation.

mod client;

pub use client::{TmdbClient, TmdbClientConfig};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::error::Result;

/// A movie credit of a person in a cast role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credit {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// A cast member of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CastMember {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    /// Billing rank within the movie, 0 is top-billed.
    #[serde(default)]
    pub order: Option<u32>,
}

/// Body shape shared by `/person/{id}/movie_credits` and `/movie/{id}/credits`.
/// Entries without a usable `cast` array (missing or `null`) decode as empty.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct CastEnvelope<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cast: Vec<T>,
}

/// TMDb sends `null` for display fields it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// TMDb ids are numbers on the wire; the graph keys them as strings.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Inclusive release-date window over `YYYY-MM-DD` strings.
///
/// Dates are compared as plain strings; the fixed-width zero-padded format
/// makes that equivalent to calendar order. Either bound may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// A window with no bounds accepts every credit.
    pub fn unbounded() -> Self {
        Self::default()
    }

    fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a release date falls inside the window.
    /// A missing date is only accepted by an unbounded window.
    pub fn contains(&self, release_date: Option<&str>) -> bool {
        let date = match release_date {
            Some(date) => date,
            None => return self.is_unbounded(),
        };
        if let Some(start) = &self.start {
            if date < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end {
            if date > end.as_str() {
                return false;
            }
        }
        true
    }
}

/// Keep the credits released inside `window`, preserving response order.
pub fn filter_credits(credits: Vec<Credit>, window: &DateWindow) -> Vec<Credit> {
    credits
        .into_iter()
        .filter(|c| window.contains(c.release_date.as_deref()))
        .collect()
}

/// Apply the billing limit, then the exclusions.
///
/// Members are ranked by `order` (missing ranks last, ties keep response
/// order). `limit` keeps the first N ranks of the unfiltered list; excluded
/// ids are then dropped without pulling in lower-billed members, so
/// `limit = 5` with one excluded top-5 member yields 4 members.
pub fn select_cast(
    mut cast: Vec<CastMember>,
    limit: Option<usize>,
    exclude_ids: &[String],
) -> Vec<CastMember> {
    cast.sort_by_key(|member| member.order.unwrap_or(u32::MAX));
    if let Some(limit) = limit {
        cast.truncate(limit);
    }
    cast.retain(|member| !exclude_ids.contains(&member.id));
    cast
}

/// Where the crawler gets credits and cast lists from.
#[async_trait]
pub trait CreditsSource: Send + Sync {
    /// Movie credits of a person whose release date falls inside `window`.
    async fn get_credits(&self, person_id: &str, window: &DateWindow) -> Result<Vec<Credit>>;

    /// Cast of a movie ranked by billing order, limited then filtered by
    /// `exclude_ids` as described on [`select_cast`].
    async fn get_cast(
        &self,
        movie_id: &str,
        limit: Option<usize>,
        exclude_ids: &[String],
    ) -> Result<Vec<CastMember>>;
}
