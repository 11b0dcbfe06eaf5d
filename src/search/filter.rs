//! Category and relevance filtering, and the fuzzy re-rank window.

use super::scoring::candidate_relevance;
use super::tokenize::{contains_words, match_key};
use crate::config::RankingConfig;
use crate::franchise::{Franchise, match_flagship};
use crate::types::{Category, GameCandidate};

/// Drops seasons unconditionally and bundles without strong quality.
pub fn category_filter(candidates: Vec<GameCandidate>) -> Vec<GameCandidate> {
    candidates
        .into_iter()
        .filter(|game| match game.category {
            Category::Season => {
                tracing::trace!("Dropped season '{}'", game.name);
                false
            }
            Category::Bundle if !game.quality.is_strong() => {
                tracing::trace!("Dropped weak bundle '{}'", game.name);
                false
            }
            _ => true,
        })
        .collect()
}

/// A candidate together with its best relevance across query variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Relevant {
    pub game: GameCandidate,
    pub relevance: f64,
}

/// Whether a candidate belongs to the franchise, by franchise field or flagship match.
pub fn is_franchise_member(game: &GameCandidate, franchise: &Franchise) -> bool {
    let by_field = game.franchise.as_deref().map(match_key).is_some_and(|key| {
        !key.is_empty()
            && (contains_words(&key, franchise.name_key())
                || franchise
                    .pattern_keys
                    .iter()
                    .any(|pattern| contains_words(&key, pattern)))
    });
    by_field || match_flagship(franchise, &game.name).is_some()
}

/// Minimum relevance for the query class.
pub fn relevance_threshold(config: &RankingConfig, franchise_query: bool) -> f64 {
    if franchise_query {
        config.franchise_relevance_threshold
    } else {
        config.title_relevance_threshold
    }
}

/// Scores relevance against every variant and drops candidates below the
/// threshold. Members of a detected franchise are kept regardless.
pub fn relevance_filter(
    candidates: Vec<GameCandidate>,
    queries: &[String],
    franchise: Option<&Franchise>,
    config: &RankingConfig,
) -> Vec<Relevant> {
    let threshold = relevance_threshold(config, franchise.is_some());

    candidates
        .into_iter()
        .filter_map(|game| {
            let relevance = candidate_relevance(&game, queries);
            let member = franchise.is_some_and(|f| is_franchise_member(&game, f));
            if relevance >= threshold || member {
                Some(Relevant { game, relevance })
            } else {
                tracing::trace!(
                    "Dropped '{}': relevance {:.1} < {:.1}",
                    game.name,
                    relevance,
                    threshold
                );
                None
            }
        })
        .collect()
}

/// Keeps the `window` most relevant candidates. Ties keep retrieval order.
pub fn fuzzy_rerank(mut candidates: Vec<Relevant>, window: usize) -> Vec<Relevant> {
    candidates.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    candidates.truncate(window.max(1));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::franchise::FranchiseTable;
    use crate::types::{QualitySignals, Source};
    use assert2::check;
    use rstest::rstest;

    fn game(name: &str, category: Category) -> GameCandidate {
        let mut game = GameCandidate::new(name, Source::Local);
        game.category = category;
        game
    }

    #[rstest]
    #[case(Category::MainGame, QualitySignals::default(), true)]
    #[case(Category::Season, QualitySignals { follows: 50_000, ..QualitySignals::default() }, false)]
    #[case(Category::Bundle, QualitySignals::default(), false)]
    #[case(Category::Bundle, QualitySignals { follows: 5_000, ..QualitySignals::default() }, true)]
    #[case(Category::Mod, QualitySignals::default(), true)]
    fn test_category_filter(
        #[case] category: Category,
        #[case] quality: QualitySignals,
        #[case] kept: bool,
    ) {
        let mut candidate = game("Anything", category);
        candidate.quality = quality;
        check!(category_filter(vec![candidate]).len() == usize::from(kept));
    }

    #[test]
    fn test_franchise_threshold_is_more_permissive() {
        let config = RankingConfig::default();
        check!(relevance_threshold(&config, true) < relevance_threshold(&config, false));
    }

    #[test]
    fn test_relevance_filter_drops_unrelated() {
        let queries = vec!["metroid".to_string()];
        let kept = relevance_filter(
            vec![
                game("Super Metroid", Category::MainGame),
                game("Stardew Valley", Category::MainGame),
            ],
            &queries,
            None,
            &RankingConfig::default(),
        );
        check!(kept.len() == 1);
        check!(kept[0].relevance == 70.0);
    }

    #[test]
    fn test_franchise_members_survive_threshold() {
        let table = FranchiseTable::embedded().unwrap();
        let zelda = table.get("zelda");
        let queries = vec!["zelda".to_string()];

        let mut member = game("Link's Awakening", Category::MainGame);
        member.franchise = Some("The Legend of Zelda".to_string());

        let kept = relevance_filter(
            vec![member, game("Stardew Valley", Category::MainGame)],
            &queries,
            zelda,
            &RankingConfig::default(),
        );
        check!(kept.len() == 1);
        check!(kept[0].game.name == "Link's Awakening");
    }

    #[test]
    fn test_fuzzy_rerank_window() {
        let relevant = |name: &str, relevance| Relevant {
            game: game(name, Category::MainGame),
            relevance,
        };
        let ranked = fuzzy_rerank(
            vec![relevant("a", 50.0), relevant("b", 100.0), relevant("c", 50.0)],
            2,
        );
        let names: Vec<_> = ranked.iter().map(|r| r.game.name.as_str()).collect();
        check!(names == vec!["b", "a"]);
    }
}
