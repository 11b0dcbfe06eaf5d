//! Provider response shape and its adapter to [`GameCandidate`].

use crate::types::{Category, GameCandidate, Platform, QualitySignals, Source};
use serde::Deserialize;

/// Fields requested for every game lookup.
pub const GAME_FIELDS: &str = "name,summary,cover.url,first_release_date,genres.name,\
platforms.name,involved_companies.company.name,involved_companies.developer,\
involved_companies.publisher,aggregated_rating,rating,total_rating,total_rating_count,\
follows,hypes,franchises.name,collections.name,alternative_names.name,similar_games,category";

/// A related entity the provider returns either expanded (`{"name": ...}`),
/// as a bare string, or as an unexpanded id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NamedRef {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
    Id(u64),
}

impl NamedRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Object { name } => name.as_deref(),
            Self::Id(_) => None,
        }
        .map(str::trim)
        .filter(|n| !n.is_empty())
    }
}

fn names(refs: &[NamedRef]) -> Vec<String> {
    refs.iter()
        .filter_map(NamedRef::name)
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvolvedCompany {
    pub company: Option<NamedRef>,
    #[serde(default)]
    pub developer: bool,
    #[serde(default)]
    pub publisher: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Cover {
    pub url: Option<String>,
}

/// A game as returned by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalGame {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub first_release_date: Option<i64>,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub platforms: Vec<NamedRef>,
    #[serde(default)]
    pub involved_companies: Vec<InvolvedCompany>,
    #[serde(default)]
    pub franchises: Vec<NamedRef>,
    #[serde(default)]
    pub collections: Vec<NamedRef>,
    #[serde(default)]
    pub alternative_names: Vec<NamedRef>,
    #[serde(default)]
    pub total_rating: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub aggregated_rating: Option<f64>,
    #[serde(default)]
    pub total_rating_count: Option<u32>,
    #[serde(default)]
    pub follows: Option<u32>,
    #[serde(default)]
    pub hypes: Option<u32>,
    #[serde(default)]
    pub similar_games: Vec<u64>,
    #[serde(default)]
    pub category: Option<u8>,
    #[serde(default)]
    pub cover: Option<Cover>,
}

impl ExternalGame {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            summary: None,
            first_release_date: None,
            genres: Vec::new(),
            platforms: Vec::new(),
            involved_companies: Vec::new(),
            franchises: Vec::new(),
            collections: Vec::new(),
            alternative_names: Vec::new(),
            total_rating: None,
            rating: None,
            aggregated_rating: None,
            total_rating_count: None,
            follows: None,
            hypes: None,
            similar_games: Vec::new(),
            category: None,
            cover: None,
        }
    }

    /// The last company flagged by `pick` wins, matching the provider's ordering.
    fn company(&self, pick: impl Fn(&InvolvedCompany) -> bool) -> Option<String> {
        self.involved_companies
            .iter()
            .filter(|c| pick(c))
            .filter_map(|c| c.company.as_ref().and_then(NamedRef::name))
            .last()
            .map(String::from)
    }
}

/// Makes protocol-relative image URLs absolute and requests the full-size image.
pub fn normalize_cover_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let absolute = if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    };
    Some(absolute.replace("t_thumb", "t_1080p"))
}

impl From<ExternalGame> for GameCandidate {
    fn from(external: ExternalGame) -> Self {
        let developer = external.company(|c| c.developer);
        let publisher = external.company(|c| c.publisher);
        let franchise = external
            .franchises
            .iter()
            .chain(&external.collections)
            .find_map(NamedRef::name)
            .map(String::from);

        let mut game = Self::new(external.name, Source::External);
        game.external_id = Some(external.id);
        game.alternate_names = names(&external.alternative_names);
        game.summary = external.summary;
        game.category = Category::from_code(external.category);
        game.release_date = external.first_release_date;
        game.genres = names(&external.genres);
        game.platforms = names(&external.platforms)
            .into_iter()
            .map(Platform::new)
            .collect();
        game.developer = developer;
        game.publisher = publisher;
        game.franchise = franchise;
        game.related_ids = external.similar_games;
        game.cover_url = external
            .cover
            .and_then(|c| c.url)
            .and_then(|u| normalize_cover_url(&u));
        game.quality = QualitySignals {
            rating: external
                .total_rating
                .or(external.rating)
                .or(external.aggregated_rating),
            rating_count: external.total_rating_count.unwrap_or(0),
            follows: external.follows.unwrap_or(0),
            hypes: external.hypes.unwrap_or(0),
        };
        game
    }
}
