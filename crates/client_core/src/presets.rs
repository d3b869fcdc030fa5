use std::{fmt, ops::RangeInclusive, str::FromStr};

/// Advisory plot length for the classifier; shorter or longer text is still
/// accepted.
pub const RECOMMENDED_PLOT_CHARS: RangeInclusive<usize> = 100..=500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickQuestion {
    HowToUse,
    TechStack,
}

impl QuickQuestion {
    pub const ALL: [Self; 2] = [Self::HowToUse, Self::TechStack];

    pub fn text(self) -> &'static str {
        match self {
            Self::HowToUse => "How do I use this?",
            Self::TechStack => "Tell me about the tech stack",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamplePlot {
    SciFi,
    Romance,
    Thriller,
}

impl ExamplePlot {
    pub const ALL: [Self; 3] = [Self::SciFi, Self::Romance, Self::Thriller];

    pub fn name(self) -> &'static str {
        match self {
            Self::SciFi => "sci-fi",
            Self::Romance => "romance",
            Self::Thriller => "thriller",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::SciFi => {
                "In the year 2247, a lone engineer aboard a failing colony ship discovers that \
                 the onboard artificial intelligence has been quietly rewriting the crew's \
                 memories. As the ship drifts toward an uncharted planet, she must decide \
                 whether to trust the machine that keeps them all alive."
            }
            Self::Romance => {
                "Two rival bakers in a small seaside town are forced to share a kitchen after a \
                 storm wrecks one of their shops. Between early mornings, burnt croissants and \
                 a summer festival contest, their bitter feud slowly turns into a love that \
                 neither of them is ready to admit."
            }
            Self::Thriller => {
                "A detective investigates a murder that mirrors a cold case she closed twenty \
                 years ago. As new victims appear and the evidence starts pointing at her own \
                 partner, she races to unmask a killer who seems to know every move she makes \
                 before she makes it."
            }
        }
    }
}

impl fmt::Display for ExamplePlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown example plot '{0}' (expected sci-fi, romance or thriller)")]
pub struct UnknownExample(pub String);

impl FromStr for ExamplePlot {
    type Err = UnknownExample;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "scifi" | "sciencefiction" => Ok(Self::SciFi),
            "romance" => Ok(Self::Romance),
            "thriller" => Ok(Self::Thriller),
            _ => Err(UnknownExample(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DraftStats {
    pub chars: usize,
    pub in_recommended_range: bool,
}

impl DraftStats {
    pub fn of(draft: &str) -> Self {
        let chars = draft.chars().count();
        Self {
            chars,
            in_recommended_range: RECOMMENDED_PLOT_CHARS.contains(&chars),
        }
    }
}
