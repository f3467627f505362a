use std::fmt;

use rand::Rng;

/// Class applied once a slide has committed its start state; the external
/// stylesheet animates the start -> active change.
pub const ACTIVE_CLASS: &str = "active";

/// Retiring slides always fade out, whatever effect brought them in.
pub const EXIT_CLASS: &str = "start-fade";

/// The closed set of enter effects. Each variant is only a key into the
/// visual-effect contract; the controller never looks past the class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Fade,
    SlideLeft,
    SlideRight,
    Zoom,
    Rotate,
}

impl Transition {
    pub const ALL: [Self; 5] = [
        Self::Fade,
        Self::SlideLeft,
        Self::SlideRight,
        Self::Zoom,
        Self::Rotate,
    ];

    /// Pre-transition class for the enter effect.
    pub fn start_class(self) -> &'static str {
        match self {
            Self::Fade => "start-fade",
            Self::SlideLeft => "start-slide-left",
            Self::SlideRight => "start-slide-right",
            Self::Zoom => "start-zoom",
            Self::Rotate => "start-rotate",
        }
    }

    /// Uniform pick over the fixed set. The rng is injected so callers can
    /// seed it; no determinism is promised beyond that.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.start_class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn picks_stay_within_the_fixed_set() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let t = Transition::pick(&mut rng);
            assert!(Transition::ALL.contains(&t));
        }
    }

    #[test]
    fn every_effect_is_eventually_chosen() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(Transition::pick(&mut rng));
        }
        assert_eq!(seen.len(), Transition::ALL.len());
    }

    #[test]
    fn class_names_match_the_stylesheet_contract() {
        assert_eq!(Transition::Fade.start_class(), "start-fade");
        assert_eq!(Transition::SlideLeft.start_class(), "start-slide-left");
        assert_eq!(Transition::SlideRight.start_class(), "start-slide-right");
        assert_eq!(Transition::Zoom.start_class(), "start-zoom");
        assert_eq!(Transition::Rotate.start_class(), "start-rotate");
    }
}
