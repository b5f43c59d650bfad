use serde::{Deserialize, Serialize};

/// Qualitative reading of an IAT effect, ordered from strongest reversed
/// association to strongest expected association.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Incongruent pairing much faster
    StrongReversed,
    ModerateReversed,
    Negligible,
    Moderate,
    /// Congruent pairing much faster
    Strong,
}

/// Magnitude cut-offs in ms. Presentation policy, not part of the score.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub moderate_ms: f64,
    pub strong_ms: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            moderate_ms: 50.0,
            strong_ms: 200.0,
        }
    }
}

impl Band {
    /// Symmetric around zero; a boundary value falls into the weaker band.
    pub fn classify(effect_ms: f64, thresholds: &BandThresholds) -> Self {
        let magnitude = effect_ms.abs();
        let positive = effect_ms > 0.0;
        if magnitude > thresholds.strong_ms {
            if positive { Band::Strong } else { Band::StrongReversed }
        } else if magnitude > thresholds.moderate_ms {
            if positive { Band::Moderate } else { Band::ModerateReversed }
        } else {
            Band::Negligible
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Band::Strong => "strong implicit association with the congruent pairing",
            Band::Moderate => "slight to moderate implicit association with the congruent pairing",
            Band::Negligible => "weak or no clear implicit association",
            Band::ModerateReversed => {
                "slight to moderate implicit association with the incongruent pairing"
            }
            Band::StrongReversed => "strong implicit association with the incongruent pairing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bands() {
        let t = BandThresholds::default();
        assert_eq!(Band::classify(300.0, &t), Band::Strong);
        assert_eq!(Band::classify(200.0, &t), Band::Moderate);
        assert_eq!(Band::classify(51.0, &t), Band::Moderate);
        assert_eq!(Band::classify(50.0, &t), Band::Negligible);
        assert_eq!(Band::classify(0.0, &t), Band::Negligible);
        assert_eq!(Band::classify(-50.0, &t), Band::Negligible);
        assert_eq!(Band::classify(-120.0, &t), Band::ModerateReversed);
        assert_eq!(Band::classify(-201.0, &t), Band::StrongReversed);
    }

    #[test]
    fn classification_is_monotonic() {
        let t = BandThresholds::default();
        let mut previous = Band::StrongReversed;
        for effect in (-400..=400).map(|ms| ms as f64) {
            let band = Band::classify(effect, &t);
            assert!(band >= previous, "{effect} ms went from {previous:?} to {band:?}");
            previous = band;
        }
        assert_eq!(previous, Band::Strong);
    }

    #[test]
    fn custom_thresholds() {
        let t = BandThresholds {
            moderate_ms: 10.0,
            strong_ms: 150.0,
        };
        assert_eq!(Band::classify(151.0, &t), Band::Strong);
        assert_eq!(Band::classify(-11.0, &t), Band::ModerateReversed);
        assert!(!Band::Negligible.description().is_empty());
    }
}
