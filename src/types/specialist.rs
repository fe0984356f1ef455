use serde::{Deserialize, Serialize};
use std::fmt;

/// Advice domains served by the specialist endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialist {
    Trainer,
    Diet,
    Energy,
}

impl Specialist {
    pub const ALL: [Specialist; 3] = [Specialist::Trainer, Specialist::Diet, Specialist::Energy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialist::Trainer => "trainer",
            Specialist::Diet => "diet",
            Specialist::Energy => "energy",
        }
    }

    /// Parses a label such as `"diet"` or the trailing segment of `"/api/diet"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let tail = label.rsplit('/').next().unwrap_or(label);
        Self::ALL.into_iter().find(|s| s.as_str() == tail)
    }

    /// HTTP route serving this specialist.
    pub fn path(&self) -> &'static str {
        match self {
            Specialist::Trainer => "/api/trainer",
            Specialist::Diet => "/api/diet",
            Specialist::Energy => "/api/energy",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Specialist::Trainer => {
                "You are an elite professional fitness trainer. Answer concretely: exercises, \
                 sets, repetitions, load progression. Be motivating and strict."
            }
            Specialist::Diet => {
                "You are a leading clinical dietitian and professor of nutrition science. Answer \
                 scientifically: macronutrient and calorie calculation, meal schedule, specific foods."
            }
            Specialist::Energy => {
                "You are a professor of sports medicine specialising in circadian rhythms. Answer \
                 as a scientist: recovery techniques, daily routine, breathing practices, sleep optimisation."
            }
        }
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_accepts_paths() {
        assert_eq!(Specialist::from_label("trainer"), Some(Specialist::Trainer));
        assert_eq!(Specialist::from_label("/api/diet"), Some(Specialist::Diet));
        assert_eq!(Specialist::from_label("/api/energy"), Some(Specialist::Energy));
        assert_eq!(Specialist::from_label("/api/query"), None);
        assert_eq!(Specialist::from_label(""), None);
    }

    #[test]
    fn test_path_round_trips_through_label() {
        for s in Specialist::ALL {
            assert_eq!(Specialist::from_label(s.path()), Some(s));
        }
    }
}
