use std::collections::BTreeSet;

use dermis_core::domain::ingredient::{Concern, IngredientId};
use dermis_core::knowledge::{normalize_key, IngredientCatalog};

/// Words that name a skin concern. Skin-type words ("dry", "oily") are not concerns.
const CONCERN_KEYWORDS: &[(&str, Concern)] = &[
    ("acne", Concern::Acne),
    ("breakout", Concern::Acne),
    ("breakouts", Concern::Acne),
    ("pimples", Concern::Acne),
    ("aging", Concern::Aging),
    ("ageing", Concern::Aging),
    ("wrinkles", Concern::Aging),
    ("hyperpigmentation", Concern::Hyperpigmentation),
    ("pigmentation", Concern::Hyperpigmentation),
    ("melasma", Concern::Hyperpigmentation),
    ("dryness", Concern::Dryness),
    ("dehydration", Concern::Dryness),
    ("oiliness", Concern::Oiliness),
    ("shine", Concern::Oiliness),
    ("sensitivity", Concern::Sensitivity),
    ("redness", Concern::Redness),
    ("rosacea", Concern::Redness),
    ("dullness", Concern::Dullness),
    ("texture", Concern::Texture),
    ("pores", Concern::Pores),
];

/// A question after normalization, tokenization and ingredient mention scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedQuestion {
    pub normalized: String,
    pub tokens: Vec<String>,
    /// Mentioned ingredients in order of first appearance, without duplicates.
    pub mentions: Vec<IngredientId>,
    /// Tokens consumed by ingredient mentions; excluded from cue matching.
    pub mention_spans: BTreeSet<usize>,
    /// Concerns named outside ingredient mentions, in order of first appearance.
    pub concerns: Vec<Concern>,
}

impl ParsedQuestion {
    pub fn parse(catalog: &IngredientCatalog, question: &str) -> Self {
        let normalized = normalize_text(question);
        let tokens = tokenize(&normalized);
        let (mentions, mention_spans) = scan_mentions(catalog, &tokens);
        let mut parsed = Self { normalized, tokens, mentions, mention_spans, concerns: Vec::new() };
        parsed.concerns = scan_concerns(parsed.cue_tokens());
        parsed
    }

    /// Tokens outside ingredient mentions.
    pub fn cue_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.mention_spans.contains(index))
            .map(|(_, token)| token.as_str())
    }

    pub fn has_cue(&self, cues: &[&str]) -> bool {
        self.cue_tokens().any(|token| cues.contains(&token))
    }

    /// Multi-word phrase match over the full token stream.
    pub fn has_phrase(&self, phrase: &[&str]) -> bool {
        !phrase.is_empty()
            && self.tokens.windows(phrase.len()).any(|window| {
                window.iter().zip(phrase).all(|(token, expected)| token == expected)
            })
    }
}

pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Same rule as catalog key normalization: `retin-a` becomes `retin`, `a`.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_key(text).split(' ').filter(|token| !token.is_empty()).map(str::to_string).collect()
}

fn scan_concerns<'t>(tokens: impl Iterator<Item = &'t str>) -> Vec<Concern> {
    let mut concerns = Vec::new();
    for token in tokens {
        let found = CONCERN_KEYWORDS.iter().find(|(keyword, _)| *keyword == token);
        if let Some((_, concern)) = found {
            if !concerns.contains(concern) {
                concerns.push(*concern);
            }
        }
    }
    concerns
}

/// Greedy left-to-right scan; at each position the longest alias wins, so a longer alias is
/// never shadowed by a shorter one sharing its prefix.
pub fn scan_mentions(
    catalog: &IngredientCatalog,
    tokens: &[String],
) -> (Vec<IngredientId>, BTreeSet<usize>) {
    let patterns = catalog.alias_patterns();
    let mut mentions = Vec::new();
    let mut spans = BTreeSet::new();
    let mut position = 0;

    while position < tokens.len() {
        let matched = patterns.iter().find(|pattern| {
            let end = position + pattern.tokens.len();
            end <= tokens.len()
                && tokens[position..end].iter().zip(&pattern.tokens).all(|(left, right)| left == right)
        });

        match matched {
            Some(pattern) => {
                if !mentions.contains(&pattern.id) {
                    mentions.push(pattern.id.clone());
                }
                spans.extend(position..position + pattern.tokens.len());
                position += pattern.tokens.len();
            }
            None => position += 1,
        }
    }

    (mentions, spans)
}
