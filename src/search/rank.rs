//! Composite scoring and the final total order.

use super::filter::Relevant;
use super::platform::{PlatformClass, description_bonus, platform_boost, recency_boost};
use super::quality::{SubScores, buzz_score, franchise_importance, likes_score, rating_score};
use crate::config::ScoringWeights;
use crate::franchise::{Franchise, flagship_boost};
use crate::types::{RankedGame, ScoreBreakdown};
use std::cmp::Ordering;

/// Request-scoped inputs shared by every candidate's score.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub franchise: Option<&'a Franchise>,
    pub weights: ScoringWeights,
    /// Year recency is measured against. Fixed for the whole request.
    pub reference_year: i32,
}

/// Computes every sub-score and boost for one candidate.
pub fn score(candidate: Relevant, ctx: &ScoringContext<'_>) -> RankedGame {
    let Relevant { game, relevance } = candidate;

    let sub = SubScores {
        relevance,
        rating: rating_score(&game),
        likes: likes_score(&game),
        buzz: buzz_score(&game),
        franchise_importance: franchise_importance(&game, ctx.franchise),
    };
    let flagship = flagship_boost(&game, ctx.franchise);
    let platform = platform_boost(&game, ctx.franchise);
    let class = PlatformClass::of(&game.platforms);
    let recency = recency_boost(&game, ctx.reference_year);

    let mut scores = ScoreBreakdown {
        relevance: sub.relevance,
        rating: sub.rating,
        likes: sub.likes,
        buzz: sub.buzz,
        franchise_importance: sub.franchise_importance,
        weighted: sub.weighted(&ctx.weights),
        flagship_boost: flagship.score,
        platform_boost: platform.score,
        platform_class_bonus: class.bonus(),
        recency_boost: recency.score,
        description_bonus: description_bonus(&game),
        ..ScoreBreakdown::default()
    };

    scores.explain(format!("name match {:.0}", scores.relevance));
    if let Some(reason) = flagship.reason {
        scores.explain(reason);
    }
    if let Some(reason) = platform.reason {
        scores.explain(reason);
    }
    if scores.platform_class_bonus > 0.0 {
        scores.explain(format!("{}: +{:.0}", class, scores.platform_class_bonus));
    }
    if let Some(reason) = recency.reason {
        scores.explain(reason);
    }
    if scores.description_bonus > 0.0 {
        scores.explain(format!("has description: +{:.0}", scores.description_bonus));
    }

    let composite = scores.weighted
        + scores.flagship_boost
        + scores.platform_boost
        + scores.platform_class_bonus
        + scores.recency_boost
        + scores.description_bonus;
    scores.composite = if composite.is_finite() {
        composite.max(0.0)
    } else {
        0.0
    };

    tracing::trace!("Scored '{}': {:.2}", game.name, scores.composite);
    RankedGame { game, scores }
}

/// Composite descending, then critical rating descending, then name, then identity.
pub fn compare(a: &RankedGame, b: &RankedGame) -> Ordering {
    b.scores
        .composite
        .total_cmp(&a.scores.composite)
        .then_with(|| {
            b.game
                .quality
                .rating_or_zero()
                .total_cmp(&a.game.quality.rating_or_zero())
        })
        .then_with(|| a.game.normalized_name.cmp(&b.game.normalized_name))
        .then_with(|| a.game.key().cmp(&b.game.key()))
}

/// Sorts into the final order and truncates to `limit`.
pub fn final_sort(mut ranked: Vec<RankedGame>, limit: usize) -> Vec<RankedGame> {
    ranked.sort_by(compare);
    ranked.truncate(limit);
    ranked
}
