//! The local store's record shape and its adapters to and from [`GameCandidate`].

use crate::types::{Category, GameCandidate, Platform, QualitySignals, Source};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A game row as the catalog stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogRecord {
    /// Assigned by the catalog on insert.
    pub id: i64,
    pub igdb_id: Option<u64>,
    pub name: String,
    pub summary: Option<String>,
    /// ISO `YYYY-MM-DD`.
    pub release_date: Option<String>,
    pub platforms: Vec<String>,
    pub genres: Vec<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub total_rating: Option<f64>,
    pub rating_count: u32,
    pub follows: u32,
    pub hypes: u32,
    pub franchise_name: Option<String>,
    pub collection_name: Option<String>,
    pub alternative_names: Vec<String>,
    pub similar_game_ids: Vec<u64>,
    /// Provider category code.
    pub category: Option<u8>,
    pub cover_url: Option<String>,
}

impl CatalogRecord {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), DATE_FORMAT).ok())
            .map(|d| d.year())
    }
}

fn parse_release_date(date: &str) -> Option<i64> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

fn format_release_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format(DATE_FORMAT).to_string())
}

impl From<CatalogRecord> for GameCandidate {
    fn from(record: CatalogRecord) -> Self {
        let mut game = Self::new(record.name, Source::Local);
        game.local_id = Some(record.id);
        game.external_id = record.igdb_id;
        game.alternate_names = record.alternative_names;
        game.summary = record.summary;
        game.category = Category::from_code(record.category);
        game.release_date = record.release_date.as_deref().and_then(parse_release_date);
        game.genres = record.genres;
        game.platforms = record.platforms.into_iter().map(Platform::new).collect();
        game.developer = record.developer;
        game.publisher = record.publisher;
        game.franchise = record.franchise_name.or(record.collection_name);
        game.related_ids = record.similar_game_ids;
        game.cover_url = record.cover_url;
        game.quality = QualitySignals {
            rating: record.total_rating,
            rating_count: record.rating_count,
            follows: record.follows,
            hypes: record.hypes,
        };
        game
    }
}

impl From<&GameCandidate> for CatalogRecord {
    /// Builds an insertable record. The id is left at zero for the catalog to assign.
    fn from(game: &GameCandidate) -> Self {
        Self {
            id: 0,
            igdb_id: game.external_id,
            name: game.name.clone(),
            summary: game.summary.clone(),
            release_date: game.release_date.and_then(format_release_date),
            platforms: game.platforms.iter().map(|p| p.name.clone()).collect(),
            genres: game.genres.clone(),
            developer: game.developer.clone(),
            publisher: game.publisher.clone(),
            total_rating: game.quality.rating,
            rating_count: game.quality.rating_count,
            follows: game.quality.follows,
            hypes: game.quality.hypes,
            franchise_name: game.franchise.clone(),
            collection_name: None,
            alternative_names: game.alternate_names.clone(),
            similar_game_ids: game.related_ids.clone(),
            category: Some(game.category.code()),
            cover_url: game.cover_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn record() -> CatalogRecord {
        CatalogRecord {
            id: 7,
            igdb_id: Some(1074),
            name: "Super Mario 64".to_string(),
            release_date: Some("1996-06-23".to_string()),
            platforms: vec!["Nintendo 64".to_string()],
            total_rating: Some(92.0),
            rating_count: 1500,
            collection_name: Some("Super Mario".to_string()),
            category: Some(9),
            ..CatalogRecord::default()
        }
    }

    #[test]
    fn test_record_to_candidate() {
        let game = GameCandidate::from(record());
        check!(game.local_id == Some(7));
        check!(game.external_id == Some(1074));
        check!(game.source == Source::Local);
        check!(game.category == Category::MainGame);
        check!(game.release_year() == Some(1996));
        check!(game.franchise.as_deref() == Some("Super Mario"));
        check!(game.normalized_name == "super mario 64");
        check!(game.quality.rating == Some(92.0));
    }

    #[test]
    fn test_candidate_to_record_keeps_date() {
        let game = GameCandidate::from(record());
        let back = CatalogRecord::from(&game);
        check!(back.id == 0);
        check!(back.release_date.as_deref() == Some("1996-06-23"));
        check!(back.category == Some(0));
        check!(back.franchise_name.as_deref() == Some("Super Mario"));
    }

    #[test]
    fn test_bad_date_is_ignored() {
        let mut bad = record();
        bad.release_date = Some("sometime in 1996".to_string());
        check!(GameCandidate::from(bad).release_date.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let parsed: CatalogRecord = serde_json::from_str(r#"{"name": "Halo"}"#).unwrap();
        check!(parsed.name == "Halo");
        check!(parsed.platforms.is_empty());
        check!(parsed.release_year().is_none());
    }
}
