//! `search_games` tool: runs the pipeline and formats the ranked list.

use crate::search::SearchPipeline;
use crate::types::{RankedGame, SearchOptions};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Upper bound on results a single tool call may request.
const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchGamesRequest {
    /// Game title, franchise name or abbreviation (e.g. "zelda", "gta 5")
    pub query: String,
    /// Maximum number of results to return (default: 20)
    #[serde(default)]
    pub limit: Option<usize>,
    /// Also query the external metadata provider (default: true)
    #[serde(default)]
    pub include_external: Option<bool>,
    /// Hide fan-made and micro-content entries (default: true)
    #[serde(default)]
    pub apply_content_filter: Option<bool>,
}

impl SearchGamesRequest {
    pub fn options(&self) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            include_external_source: self
                .include_external
                .unwrap_or(defaults.include_external_source),
            limit: self.limit.unwrap_or(defaults.limit).clamp(1, MAX_LIMIT),
            apply_content_filter: self
                .apply_content_filter
                .unwrap_or(defaults.apply_content_filter),
        }
    }
}

pub async fn handle_search_games(
    pipeline: &SearchPipeline,
    request: SearchGamesRequest,
) -> Result<String, String> {
    if request.query.trim().is_empty() {
        return Err("Query must not be empty".to_string());
    }

    let results = pipeline.search(&request.query, request.options()).await;
    if results.is_empty() {
        let mut msg = format!("No games found for '{}'.\n\n", request.query);
        msg.push_str("Search tips:\n");
        msg.push_str("• Try the franchise name alone, e.g. 'zelda'\n");
        msg.push_str("• Abbreviations like 'gta' or 'ff' are expanded automatically\n");
        if request.include_external == Some(false) {
            msg.push_str("• Enable include_external to search the metadata provider\n");
        }
        return Ok(msg);
    }

    Ok(format_results(&request.query, &results))
}

/// Numbered list with year, platforms and the score explanation per game.
pub fn format_results(query: &str, results: &[RankedGame]) -> String {
    let mut output = format!("Results for '{}':\n\n", query);

    for (idx, ranked) in results.iter().enumerate() {
        let game = &ranked.game;
        let _ = write!(output, "{}. {}", idx + 1, game.name);
        if let Some(year) = game.release_year() {
            let _ = write!(output, " ({})", year);
        }
        let _ = writeln!(output, " - score {:.1}", ranked.scores.composite);

        if !game.platforms.is_empty() {
            let platforms: Vec<&str> = game.platforms.iter().map(|p| p.name.as_str()).collect();
            let _ = writeln!(output, "   Platforms: {}", platforms.join(", "));
        }
        if let Some(rating) = game.quality.rating {
            let _ = writeln!(
                output,
                "   Rating: {:.0} ({} ratings)",
                rating, game.quality.rating_count
            );
        }
        if !ranked.scores.explanations.is_empty() {
            let _ = writeln!(output, "   Why: {}", ranked.scores.explanations.join("; "));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameCandidate, Platform, ScoreBreakdown, Source};
    use assert2::check;

    #[test]
    fn test_options_defaults_and_clamp() {
        let request: SearchGamesRequest =
            serde_json::from_str(r#"{"query": "zelda", "limit": 500}"#).unwrap();
        let options = request.options();
        check!(options.limit == MAX_LIMIT);
        check!(options.include_external_source);
        check!(options.apply_content_filter);
    }

    #[test]
    fn test_format_results() {
        let mut game = GameCandidate::new("Super Mario 64", Source::Local);
        game.platforms = vec![Platform::new("Nintendo 64")];
        let ranked = RankedGame {
            game,
            scores: ScoreBreakdown {
                composite: 250.0,
                explanations: vec!["name match 100".to_string()],
                ..ScoreBreakdown::default()
            },
        };

        let output = format_results("mario 64", &[ranked]);
        check!(output.contains("1. Super Mario 64 - score 250.0"));
        check!(output.contains("Platforms: Nintendo 64"));
        check!(output.contains("Why: name match 100"));
    }
}
