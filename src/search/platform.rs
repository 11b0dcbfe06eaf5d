//! Platform fit and release recency boosts.

use crate::franchise::Franchise;
use crate::types::{GameCandidate, Platform};
use std::fmt;

/// Upper bound of the fine-grained platform boost.
pub const MAX_PLATFORM_BOOST: f64 = 50.0;
/// Bonus for records with a real description.
pub const DESCRIPTION_BONUS: f64 = 10.0;
pub const CLASSIC_AGE_YEARS: i32 = 30;
pub const RECENT_AGE_YEARS: i32 = 3;
pub const CLASSIC_BOOST: f64 = 15.0;
pub const RECENT_BOOST: f64 = 10.0;

const PC_POINTS: i64 = 15;
const CONSOLE_POINTS: i64 = 10;
const OTHER_POINTS: i64 = 2;
const MOBILE_PENALTY: i64 = 5;

const MOBILE_MARKERS: &[&str] = &[
    "ios",
    "android",
    "windows phone",
    "windows mobile",
    "blackberry",
    "j2me",
    "mobile",
];
const PC_MARKERS: &[&str] = &["pc", "windows", "mac", "linux", "dos", "steamos", "amiga"];
const CONSOLE_MARKERS: &[&str] = &[
    "playstation",
    "ps vita",
    "xbox",
    "nintendo",
    "switch",
    "wii",
    "game boy",
    "gamecube",
    "famicom",
    "sega",
    "genesis",
    "mega drive",
    "dreamcast",
    "saturn",
    "atari",
    "neo geo",
    "turbografx",
    "arcade",
    "msx",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Pc,
    Console,
    Mobile,
    Other,
}

/// Classifies a platform by name.
pub fn platform_kind(name: &str) -> PlatformKind {
    let lower = name.to_lowercase();
    let has = |markers: &[&str]| {
        markers.iter().any(|marker| {
            lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|word| word == *marker)
                || (marker.contains(' ') && lower.contains(marker))
        })
    };

    if has(MOBILE_MARKERS) {
        PlatformKind::Mobile
    } else if has(PC_MARKERS) {
        PlatformKind::Pc
    } else if has(CONSOLE_MARKERS) {
        PlatformKind::Console
    } else {
        PlatformKind::Other
    }
}

/// Coarse platform priority. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformClass {
    MobileOnlyOrUnknown,
    MixedWithMobile,
    SingleClass,
    CrossPlatform,
}

impl PlatformClass {
    pub fn of(platforms: &[Platform]) -> Self {
        let (mut pc, mut console, mut mobile) = (false, false, false);
        for platform in platforms {
            match platform_kind(&platform.name) {
                PlatformKind::Pc => pc = true,
                PlatformKind::Console => console = true,
                PlatformKind::Mobile => mobile = true,
                PlatformKind::Other => {}
            }
        }

        match (pc || console, mobile) {
            (true, true) => Self::MixedWithMobile,
            (true, false) if pc && console => Self::CrossPlatform,
            (true, false) => Self::SingleClass,
            (false, _) => Self::MobileOnlyOrUnknown,
        }
    }

    /// Composite bonus for this class.
    pub const fn bonus(self) -> f64 {
        match self {
            Self::CrossPlatform => 30.0,
            Self::SingleClass => 20.0,
            Self::MixedWithMobile => 10.0,
            Self::MobileOnlyOrUnknown => 0.0,
        }
    }
}

impl fmt::Display for PlatformClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CrossPlatform => "PC + console",
            Self::SingleClass => "single platform class",
            Self::MixedWithMobile => "mixed with mobile",
            Self::MobileOnlyOrUnknown => "mobile-only or unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boost {
    pub score: f64,
    pub reason: Option<String>,
}

impl Boost {
    const NONE: Self = Self {
        score: 0.0,
        reason: None,
    };
}

/// Fine-grained platform points, with franchise affinity, bounded to `0..=50`.
pub fn platform_boost(game: &GameCandidate, franchise: Option<&Franchise>) -> Boost {
    if game.platforms.is_empty() {
        return Boost::NONE;
    }

    let mut points: i64 = 0;
    let mut affinity: i64 = 0;
    for platform in &game.platforms {
        points += match platform_kind(&platform.name) {
            PlatformKind::Pc => PC_POINTS,
            PlatformKind::Console => CONSOLE_POINTS,
            PlatformKind::Mobile => -MOBILE_PENALTY,
            PlatformKind::Other => OTHER_POINTS,
        };
        if let Some(franchise) = franchise {
            affinity += i64::from(franchise.platform_affinity_for(&platform.name));
        }
    }

    let score = ((points + affinity) as f64).clamp(0.0, MAX_PLATFORM_BOOST);
    if score == 0.0 {
        return Boost::NONE;
    }

    let reason = if affinity > 0 {
        format!("platform fit (incl. franchise affinity +{}): +{:.0}", affinity, score)
    } else {
        format!("platform fit: +{:.0}", score)
    };
    Boost {
        score,
        reason: Some(reason),
    }
}

/// Classics and very recent releases get a boost; the middle band is neutral.
pub fn recency_boost(game: &GameCandidate, reference_year: i32) -> Boost {
    let Some(year) = game.release_year() else {
        return Boost::NONE;
    };
    let age = reference_year - year;

    if age >= CLASSIC_AGE_YEARS {
        Boost {
            score: CLASSIC_BOOST,
            reason: Some(format!("classic ({}): +{:.0}", year, CLASSIC_BOOST)),
        }
    } else if age <= RECENT_AGE_YEARS {
        Boost {
            score: RECENT_BOOST,
            reason: Some(format!("recent ({}): +{:.0}", year, RECENT_BOOST)),
        }
    } else {
        Boost::NONE
    }
}

/// Fixed bonus for candidates that carry a description.
pub fn description_bonus(game: &GameCandidate) -> f64 {
    if game.has_description() {
        DESCRIPTION_BONUS
    } else {
        0.0
    }
}
