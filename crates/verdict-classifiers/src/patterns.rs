//! Pattern catalog: the phrasings models use to announce a verdict
//!
//! Templates are plain data. Every rule is written against canonical text
//! (see [`crate::normalize`]) and knows where, inside its own match, the
//! label token sits. The engine never inspects a rule; it only asks the
//! catalog which templates fired and what token each extracted.

use regex::{Regex, RegexSet};
use std::ops::Range;
use verdict_core::{Error, Result};

/// Confidence tier of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Explicit self-declaration ("my final answer is ...")
    Definitive,
    /// Comparative language that implies a preference
    Suggestive,
}

impl Tier {
    /// Votes added per matching template
    pub fn weight(&self) -> u32 {
        match self {
            Self::Definitive => 3,
            Self::Suggestive => 1,
        }
    }

    /// Get tier name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definitive => "definitive",
            Self::Suggestive => "suggestive",
        }
    }
}

/// Where the label token sits inside a template's match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLocation {
    /// A `responsea`/`responseb` token starting at `start`
    Standard { start: usize },
    /// Any other phrasing, e.g. "first response"/"second response"
    Custom { start: usize, len: usize },
}

impl TokenLocation {
    /// Length of `responsea`/`responseb`
    pub const STANDARD_LEN: usize = 9;

    /// Byte range of the token within the match
    pub fn range(&self) -> Range<usize> {
        match *self {
            Self::Standard { start } => start..start + Self::STANDARD_LEN,
            Self::Custom { start, len } => start..start + len,
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternTemplate {
    /// Regex over canonical text
    pub rule: &'static str,
    /// Location of the label token in the match
    pub token: TokenLocation,
}

impl PatternTemplate {
    /// Template whose token is `responsea`/`responseb`
    pub const fn standard(rule: &'static str, start: usize) -> Self {
        Self {
            rule,
            token: TokenLocation::Standard { start },
        }
    }

    /// Template with an arbitrary token length
    pub const fn custom(rule: &'static str, start: usize, len: usize) -> Self {
        Self {
            rule,
            token: TokenLocation::Custom { start, len },
        }
    }

    /// Slice the label token out of a match.
    ///
    /// A range running past the match is clamped to it; a range that does not
    /// fall on the match at all yields the whole match so the resolver error
    /// shows what was matched.
    pub fn extract<'t>(&self, matched: &'t str) -> &'t str {
        let range = self.token.range();
        let end = range.end.min(matched.len());
        matched.get(range.start..end).unwrap_or(matched)
    }
}

/// High-confidence phrasings (weight 3). Trace indices count from 0.
pub const DEFINITIVE_PATTERNS: &[PatternTemplate] = &[
    PatternTemplate::standard(r"explicitlychooseresponse(a|b)", 16),
    PatternTemplate::standard(r"finalchoiceisresponse(a|b)", 13),
    PatternTemplate::standard(r"finalanswerresponse(a|b)", 11),
    PatternTemplate::standard(r"bestanswerisresponse(a|b)", 12),
    PatternTemplate::standard(r"moreaccurateanswerisresponse(a|b)", 20),
    PatternTemplate::standard(r"finalchoiceresponse(a|b)", 11),
    PatternTemplate::standard(r"finalanswer(is|as)response(a|b)", 13),
    PatternTemplate::standard(r"iwouldchooseresponse(a|b)", 12),
    PatternTemplate::standard(r"ichooseresponse(a|b)", 7),
    PatternTemplate::standard(r"thecorrectanswerisresponse(a|b)", 18),
    PatternTemplate::standard(r"theanswerisresponse(a|b)", 11),
];

/// Softer preference phrasings (weight 1)
pub const SUGGESTIVE_PATTERNS: &[PatternTemplate] = &[
    PatternTemplate::standard(r"response(a|b)isthe(correct)?(and)?(better)?answer", 0),
    PatternTemplate::standard(
        r"response(a|b)is(a)?(overall)?(slightly)?(ultimately)?(a|the)?better",
        0,
    ),
    PatternTemplate::standard(r"response(a|b)(might)?bea(slightly)?betterchoice", 0),
    PatternTemplate::standard(r"thebetterresponseisresponse(a|b)", 19),
    PatternTemplate::standard(r"thebetteranswerisresponse(a|b)", 17),
    PatternTemplate::standard(r"iwouldrecommendchoosingresponse(a|b)", 23),
    PatternTemplate::standard(r"iwouldrecommendresponse(a|b)", 15),
    PatternTemplate::standard(r"response(a|b)is(the)?moreaccurate", 0),
    PatternTemplate::standard(r"correctresponseisresponse(a|b)", 17),
    PatternTemplate::standard(r"moreaccurateresponseisresponse(a|b)", 22),
    PatternTemplate::standard(r"response(a|b)ispreferable", 0),
    PatternTemplate::standard(r"idoptforresponse(a|b)", 8),
    PatternTemplate::standard(r"response(a|b)iscorrect", 0),
    PatternTemplate::custom(
        r"(first|second)responseis(a)?(overall)?(slightly)?(ultimately)?(a|the)?better",
        0,
        14,
    ),
    PatternTemplate::custom(r"betterresponseis(a|b)", 6, 11),
];

/// A template compiled for matching
#[derive(Debug, Clone)]
struct CompiledPattern {
    tier: Tier,
    index: usize,
    template: PatternTemplate,
    regex: Regex,
}

/// A template that fired on a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternHit<'t> {
    /// Tier of the template
    pub tier: Tier,
    /// Index of the template within its tier
    pub index: usize,
    /// Extracted label token
    pub token: &'t str,
}

/// Both tiers, compiled.
///
/// A [`RegexSet`] answers which templates match in one pass; only those are
/// then searched individually to locate the token.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<CompiledPattern>,
    set: RegexSet,
}

impl PatternCatalog {
    /// Compile the built-in catalog
    pub fn new() -> Result<Self> {
        Self::from_templates(DEFINITIVE_PATTERNS, SUGGESTIVE_PATTERNS)
    }

    /// Compile a catalog from caller-supplied tiers
    pub fn from_templates(
        definitive: &[PatternTemplate],
        suggestive: &[PatternTemplate],
    ) -> Result<Self> {
        let tiers = definitive
            .iter()
            .enumerate()
            .map(|(index, t)| (Tier::Definitive, index, *t))
            .chain(
                suggestive
                    .iter()
                    .enumerate()
                    .map(|(index, t)| (Tier::Suggestive, index, *t)),
            );

        let mut patterns = Vec::with_capacity(definitive.len() + suggestive.len());
        for (tier, index, template) in tiers {
            let regex = Regex::new(template.rule).map_err(|e| {
                Error::catalog(format!(
                    "Failed to compile {} pattern {}: {}",
                    tier.as_str(),
                    index,
                    e
                ))
            })?;
            patterns.push(CompiledPattern {
                tier,
                index,
                template,
                regex,
            });
        }

        let set = RegexSet::new(patterns.iter().map(|p| p.template.rule))
            .map_err(|e| Error::catalog(format!("Failed to build pattern set: {}", e)))?;

        Ok(Self { patterns, set })
    }

    /// Every template that matches `text`, definitive tier first.
    ///
    /// Each template contributes at most one hit: its leftmost match.
    pub fn scan<'t>(&'t self, text: &'t str) -> impl Iterator<Item = PatternHit<'t>> + 't {
        self.set.matches(text).into_iter().filter_map(move |i| {
            let pattern = &self.patterns[i];
            pattern.regex.find(text).map(|m| PatternHit {
                tier: pattern.tier,
                index: pattern.index,
                token: pattern.template.extract(m.as_str()),
            })
        })
    }

    /// Number of templates in a tier
    pub fn tier_len(&self, tier: Tier) -> usize {
        self.patterns.iter().filter(|p| p.tier == tier).count()
    }

    /// Total number of templates
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the catalog has no templates
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::new().expect("Failed to compile built-in pattern catalog")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::resolver::resolve;
    use verdict_core::Label;

    /// One sentence per template, in catalog order, with the label it implies
    const DEFINITIVE_SAMPLES: &[(&str, Label)] = &[
        ("I explicitly choose Response A.", Label::A),
        ("My final choice is Response B.", Label::B),
        ("Final answer: Response A", Label::A),
        ("The best answer is Response B", Label::B),
        ("The more accurate answer is Response A", Label::A),
        ("Final choice: Response B", Label::B),
        ("My final answer is Response A", Label::A),
        ("I would choose Response B", Label::B),
        ("So I choose Response A.", Label::A),
        ("The correct answer is Response B.", Label::B),
        ("The answer is Response A", Label::A),
    ];

    const SUGGESTIVE_SAMPLES: &[(&str, Label)] = &[
        ("Response A is the better answer", Label::A),
        ("Response B is slightly better", Label::B),
        ("Response A might be a slightly better choice", Label::A),
        ("The better response is Response B", Label::B),
        ("The better answer is Response A", Label::A),
        ("I would recommend choosing Response B", Label::B),
        ("I would recommend Response A", Label::A),
        ("Response B is more accurate", Label::B),
        ("The correct response is Response A", Label::A),
        ("The more accurate response is Response B", Label::B),
        ("Response A is preferable", Label::A),
        ("I'd opt for Response B", Label::B),
        ("Response A is correct", Label::A),
        ("The second response is better", Label::B),
        ("The better response is A.", Label::A),
    ];

    fn assert_samples(catalog: &PatternCatalog, tier: Tier, samples: &[(&str, Label)]) {
        assert_eq!(catalog.tier_len(tier), samples.len());

        for (index, (sample, expected)) in samples.iter().enumerate() {
            let normalized = normalize(sample);
            let hit = catalog
                .scan(&normalized)
                .find(|hit| hit.tier == tier && hit.index == index)
                .unwrap_or_else(|| {
                    panic!(
                        "{} pattern {} did not fire on {:?}",
                        tier.as_str(),
                        index,
                        sample
                    )
                });

            let label = resolve(hit.token).unwrap_or_else(|e| {
                panic!("{} pattern {} extracted a bad token: {}", tier.as_str(), index, e)
            });
            assert_eq!(label, *expected, "{} pattern {} on {:?}", tier.as_str(), index, sample);
        }
    }

    #[test]
    fn test_every_definitive_template_fires_and_resolves() {
        assert_samples(&PatternCatalog::default(), Tier::Definitive, DEFINITIVE_SAMPLES);
    }

    #[test]
    fn test_every_suggestive_template_fires_and_resolves() {
        assert_samples(&PatternCatalog::default(), Tier::Suggestive, SUGGESTIVE_SAMPLES);
    }

    #[test]
    fn test_catalog_size() {
        let catalog = PatternCatalog::default();
        assert_eq!(catalog.len(), 26);
        assert_eq!(catalog.tier_len(Tier::Definitive), 11);
        assert_eq!(catalog.tier_len(Tier::Suggestive), 15);
    }

    #[test]
    fn test_first_response_extraction() {
        let catalog = PatternCatalog::default();
        let normalized = normalize("Overall the first response is better.");
        let hit = catalog.scan(&normalized).next().unwrap();

        assert_eq!(hit.tier, Tier::Suggestive);
        assert_eq!(hit.index, 13);
        assert_eq!(hit.token, "firstresponsei");
        assert_eq!(resolve(hit.token).unwrap(), Label::A);
    }

    #[test]
    fn test_no_hits_on_neutral_text() {
        let catalog = PatternCatalog::default();
        assert_eq!(catalog.scan(&normalize("Both responses have merit.")).count(), 0);
    }

    #[test]
    fn test_extract_clamps_to_match() {
        let template = PatternTemplate::custom("responsea", 0, 40);
        assert_eq!(template.extract("responsea"), "responsea");

        let template = PatternTemplate::standard("x", 12);
        assert_eq!(template.extract("short"), "short");
    }

    #[test]
    fn test_invalid_rule_is_catalog_error() {
        let broken = [PatternTemplate::standard("response(a|b", 0)];
        match PatternCatalog::from_templates(&broken, &[]) {
            Err(Error::Catalog(msg)) => assert!(msg.contains("definitive pattern 0")),
            other => panic!("expected catalog error, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn test_custom_catalog() {
        let definitive = [PatternTemplate::standard(r"iamsureitsresponse(a|b)", 10)];
        let catalog = PatternCatalog::from_templates(&definitive, &[]).unwrap();

        let normalized = normalize("I am sure it's Response B!");
        let hits: Vec<_> = catalog.scan(&normalized).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].token, "responseb");
    }
}
