//! Quality and popularity sub-scores and the configurable weighted sum.

use super::tokenize::{match_key, words};
use crate::config::ScoringWeights;
use crate::franchise::Franchise;
use crate::types::GameCandidate;
use regex::Regex;
use std::sync::{LazyLock, RwLock};

/// A monotonic step curve with linear interpolation inside each band.
///
/// `bands` holds `(threshold, score)` pairs in increasing threshold order. A
/// value at or above the last threshold scores the last score. Below the
/// first threshold the score ramps linearly from zero.
#[derive(Debug, Clone, Copy)]
pub struct TierCurve {
    bands: &'static [(f64, f64)],
}

impl TierCurve {
    pub const fn new(bands: &'static [(f64, f64)]) -> Self {
        Self { bands }
    }

    pub fn score(&self, value: f64) -> f64 {
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }

        let mut lower = (0.0, 0.0);
        for &(threshold, score) in self.bands {
            if value < threshold {
                let (lo_threshold, lo_score) = lower;
                let fraction = (value - lo_threshold) / (threshold - lo_threshold);
                return lo_score + fraction * (score - lo_score);
            }
            lower = (threshold, score);
        }

        lower.1.min(100.0)
    }
}

/// Follower count: bands at 100/500/1000/2000/5000/10000.
pub const LIKES_CURVE: TierCurve = TierCurve::new(&[
    (100.0, 20.0),
    (500.0, 40.0),
    (1_000.0, 55.0),
    (2_000.0, 70.0),
    (5_000.0, 85.0),
    (10_000.0, 100.0),
]);

/// Hype count: same shape as likes on a smaller scale.
pub const BUZZ_CURVE: TierCurve = TierCurve::new(&[
    (10.0, 20.0),
    (50.0, 40.0),
    (100.0, 55.0),
    (200.0, 70.0),
    (500.0, 85.0),
    (1_000.0, 100.0),
]);

/// Rating sub-score: up to 50 points for critical rating plus up to 45 for volume.
pub fn rating_score(game: &GameCandidate) -> f64 {
    let rating = game.quality.rating_or_zero();
    let rating_points = if rating >= 90.0 {
        50.0
    } else if rating >= 80.0 {
        40.0
    } else if rating >= 70.0 {
        30.0
    } else {
        (rating.max(0.0) / 70.0) * 20.0
    };

    let count = f64::from(game.quality.rating_count);
    let volume_points = if count >= 1_000.0 {
        45.0
    } else if count >= 500.0 {
        35.0
    } else if count >= 200.0 {
        25.0
    } else if count >= 50.0 {
        15.0
    } else {
        (count / 50.0) * 10.0
    };

    (rating_points + volume_points).min(100.0)
}

pub fn likes_score(game: &GameCandidate) -> f64 {
    LIKES_CURVE.score(f64::from(game.quality.follows))
}

pub fn buzz_score(game: &GameCandidate) -> f64 {
    BUZZ_CURVE.score(f64::from(game.quality.hypes))
}

/// Title or summary signals that the entry starts its series.
static SERIES_OPENER_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(1|i|one)$").unwrap());
static SERIES_OPENER_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(first (game|title|entry|installment|instalment) in|debut (game|title|entry) of|the game that started)\b")
        .unwrap()
});

/// Maximum extra words for a name to count as a short derivative of its franchise name.
const SHORT_DERIVATIVE_WORDS: usize = 2;

/// Franchise importance: only full games qualify.
///
/// 30 base, +40 when the name equals (or is a short derivative of) the
/// franchise name, +30 when the entry signals it is the first in its series.
pub fn franchise_importance(game: &GameCandidate, detected: Option<&Franchise>) -> f64 {
    if !game.category.is_full_game() {
        return 0.0;
    }
    let franchise_key = game
        .franchise
        .as_deref()
        .map(match_key)
        .filter(|k| !k.is_empty())
        .or_else(|| detected.map(|f| f.name_key().to_string()));
    let Some(franchise_key) = franchise_key else {
        return 0.0;
    };

    let name = match_key(&game.name);
    let mut score = 30.0;

    let short_derivative = name
        .strip_prefix(franchise_key.as_str())
        .is_some_and(|rest| {
            rest.starts_with(' ') && words(rest).count() <= SHORT_DERIVATIVE_WORDS
        });
    if name == franchise_key || short_derivative {
        score += 40.0;
    }

    let opener = SERIES_OPENER_TITLE.is_match(&name)
        || game
            .summary
            .as_deref()
            .is_some_and(|s| SERIES_OPENER_SUMMARY.is_match(s));
    if opener {
        score += 30.0;
    }

    f64::min(score, 100.0)
}

/// The five sub-scores fed into the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubScores {
    pub relevance: f64,
    pub rating: f64,
    pub likes: f64,
    pub buzz: f64,
    pub franchise_importance: f64,
}

impl SubScores {
    /// `Σ subscore × weight / 100`.
    pub fn weighted(&self, weights: &ScoringWeights) -> f64 {
        self.relevance * weights.name_match / 100.0
            + self.rating * weights.rating / 100.0
            + self.likes * weights.likes / 100.0
            + self.buzz * weights.buzz / 100.0
            + self.franchise_importance * weights.franchise_importance / 100.0
    }
}

/// Supplies scoring weights. Read once per search request.
pub trait WeightSource: Send + Sync {
    fn weights(&self) -> ScoringWeights;
}

impl WeightSource for ScoringWeights {
    fn weights(&self) -> ScoringWeights {
        *self
    }
}

/// Weights that can be retuned while the process runs.
#[derive(Debug, Default)]
pub struct SharedWeights {
    inner: RwLock<ScoringWeights>,
}

impl SharedWeights {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            inner: RwLock::new(weights),
        }
    }

    /// Replaces the weights after validating them.
    pub fn update(&self, weights: ScoringWeights) -> Result<(), crate::error::ConfigError> {
        weights.validate()?;
        *self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = weights;
        tracing::info!("Scoring weights updated: {:?}", weights);
        Ok(())
    }
}

impl WeightSource for SharedWeights {
    fn weights(&self) -> ScoringWeights {
        *self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, QualitySignals, Source};
    use assert2::check;
    use rstest::rstest;

    fn rated(rating: Option<f64>, rating_count: u32) -> GameCandidate {
        let mut game = GameCandidate::new("Test", Source::Local);
        game.quality = QualitySignals {
            rating,
            rating_count,
            follows: 0,
            hypes: 0,
        };
        game
    }

    #[rstest]
    #[case(Some(95.0), 2000, 95.0)]
    #[case(Some(85.0), 600, 75.0)]
    #[case(Some(72.0), 250, 55.0)]
    #[case(Some(35.0), 25, 15.0)]
    #[case(None, 0, 0.0)]
    fn test_rating_score(
        #[case] rating: Option<f64>,
        #[case] rating_count: u32,
        #[case] expected: f64,
    ) {
        check!(rating_score(&rated(rating, rating_count)) == expected);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(50.0, 10.0)]
    #[case(100.0, 20.0)]
    #[case(300.0, 30.0)]
    #[case(7_500.0, 92.5)]
    #[case(10_000.0, 100.0)]
    #[case(250_000.0, 100.0)]
    fn test_likes_curve(#[case] follows: f64, #[case] expected: f64) {
        check!(LIKES_CURVE.score(follows) == expected);
    }

    #[test]
    fn test_curves_monotonic() {
        for curve in [LIKES_CURVE, BUZZ_CURVE] {
            let mut previous = 0.0;
            for value in (0..20_000).step_by(7) {
                let score = curve.score(f64::from(value));
                check!(score >= previous);
                check!(score <= 100.0);
                previous = score;
            }
        }
    }

    #[test]
    fn test_buzz_uses_smaller_thresholds() {
        check!(BUZZ_CURVE.score(1_000.0) == 100.0);
        check!(LIKES_CURVE.score(1_000.0) == 55.0);
    }

    #[rstest]
    #[case("Halo", Category::MainGame, None, 70.0)]
    #[case("Halo 2", Category::MainGame, None, 70.0)]
    #[case("Halo: Combat Evolved", Category::MainGame, None, 70.0)]
    #[case("Halo Wars Definitive Pack", Category::MainGame, None, 30.0)]
    #[case("Halo One", Category::MainGame, None, 100.0)]
    #[case(
        "Halo Reach",
        Category::MainGame,
        Some("The first game in the Halo saga chronologically."),
        100.0
    )]
    #[case("Halo Collection", Category::Bundle, None, 0.0)]
    fn test_franchise_importance(
        #[case] name: &str,
        #[case] category: Category,
        #[case] summary: Option<&str>,
        #[case] expected: f64,
    ) {
        let mut game = GameCandidate::new(name, Source::Local);
        game.category = category;
        game.franchise = Some("Halo".to_string());
        game.summary = summary.map(String::from);
        check!(franchise_importance(&game, None) == expected);
    }

    #[rstest]
    #[case("Rayman Origins", "Rayman")]
    #[case("Assassin's Creed Origins", "Assassin's Creed")]
    fn test_origins_subtitle_is_not_an_opener(#[case] name: &str, #[case] franchise: &str) {
        let mut game = GameCandidate::new(name, Source::Local);
        game.franchise = Some(franchise.to_string());
        check!(franchise_importance(&game, None) == 70.0);
    }

    #[test]
    fn test_franchise_importance_without_franchise() {
        let game = GameCandidate::new("Stardew Valley", Source::Local);
        check!(franchise_importance(&game, None) == 0.0);
    }

    #[test]
    fn test_weighted_sum_does_not_assume_100() {
        let scores = SubScores {
            relevance: 100.0,
            rating: 50.0,
            likes: 0.0,
            buzz: 0.0,
            franchise_importance: 0.0,
        };
        let weights = ScoringWeights {
            name_match: 80.0,
            rating: 40.0,
            likes: 0.0,
            buzz: 0.0,
            franchise_importance: 0.0,
        };
        check!(scores.weighted(&weights) == 100.0);
    }

    #[test]
    fn test_shared_weights_rejects_invalid() {
        let shared = SharedWeights::new(ScoringWeights::default());
        let invalid = ScoringWeights {
            rating: f64::NAN,
            ..ScoringWeights::default()
        };
        check!(shared.update(invalid).is_err());
        check!(shared.weights() == ScoringWeights::default());
    }
}
