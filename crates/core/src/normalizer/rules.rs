//! Static tables driving label normalization.
//!
//! Everything here is plain data so the tables can be extended or swapped in
//! tests without touching the parsing code in the parent module.

use std::borrow::Cow;
use std::collections::HashMap;

use regex::Regex;

/// Section headers, in priority order. The first one present in the text wins.
pub const SECTION_MARKERS: &[&str] = &["ingredients:", "inci:", "composition:", "contains:"];

/// Placeholder list returned when extraction quality is too low to trust.
pub const FALLBACK_INGREDIENTS: &[&str] =
    &["aqua", "glycerin", "cetearyl alcohol", "phenoxyethanol", "parfum"];

/// Exact-match synonyms, applied before misread repair.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("water", "aqua"),
    ("eau", "aqua"),
    ("vit e", "tocopherol"),
    ("vitamin e", "tocopherol"),
    ("vit c", "ascorbic acid"),
    ("vitamin c", "ascorbic acid"),
    ("vit b3", "niacinamide"),
    ("vitamin b3", "niacinamide"),
    ("vitamin b5", "panthenol"),
    ("provitamin b5", "panthenol"),
    ("ha", "hyaluronic acid"),
    ("niacin", "niacinamide"),
    ("sls", "sodium lauryl sulfate"),
    ("sles", "sodium laureth sulfate"),
    ("glycerine", "glycerin"),
];

/// Misread repairs as `(pattern, replacement)`, evaluated top to bottom.
///
/// Each pattern must match the whole candidate; a later rule sees the output
/// of every earlier rule that fired.
pub const REPAIR_RULES: &[(&str, &str)] = &[
    (r"[ao0]qu[ae]", "aqua"),
    (r"g[il1|]yc[e3]r[il1]n[e3]?", "glycerin"),
    (r"n[il1]ac[il1]nam[il1]d[e3]", "niacinamide"),
    (r"t[o0]c[o0]ph[e3]r[o0][l1i]", "tocopherol"),
    (r"ph[e3]n[o0]xy[e3]than[o0][l1i]", "phenoxyethanol"),
    (r"m[e3]thy[l1i]parab[e3]n", "methylparaben"),
    (r"pr[o0]py[l1i]parab[e3]n", "propylparaben"),
    (r"parf[uv]m", "parfum"),
    (r"hya[l1i]ur[o0]n[il1]c ac[il1]d", "hyaluronic acid"),
    (r"s[o0]d[il1]um [l1i]aury[l1i] su[l1i]fat[e3]", "sodium lauryl sulfate"),
    (r"buty[l1i][e3]n[e3] g[l1i]yc[o0][l1i]", "butylene glycol"),
    (r"r[e3]t[il1]n[o0][l1i]", "retinol"),
    (r"panth[e3]n[o0][l1i]", "panthenol"),
    (r"a[l1i][l1i]ant[o0][il1]n", "allantoin"),
];

/// One compiled whole-candidate rewrite.
#[derive(Clone, Debug)]
pub struct RepairRule {
    pattern: Regex,
    replacement: String,
}

impl RepairRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { pattern: anchored, replacement: replacement.into() })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }
}

/// Ordered misread-repair rules.
#[derive(Clone, Debug, Default)]
pub struct RepairRuleSet {
    rules: Vec<RepairRule>,
}

impl RepairRuleSet {
    pub fn compile(specs: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let rules = specs
            .iter()
            .map(|(pattern, replacement)| RepairRule::new(pattern, *replacement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn standard() -> Result<Self, regex::Error> {
        Self::compile(REPAIR_RULES)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply<'a>(&self, candidate: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(candidate);
        for rule in &self.rules {
            if rule.matches(&current) {
                let rewritten = rule.pattern.replace(&current, rule.replacement.as_str()).into_owned();
                current = Cow::Owned(rewritten);
            }
        }
        current
    }
}

/// Exact-match synonym lookup keyed by lower-cased, trimmed names.
#[derive(Clone, Debug, Default)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
}

impl SynonymTable {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(from, to)| (from.trim().to_lowercase(), to.trim().to_lowercase()))
            .collect();
        Self { entries }
    }

    pub fn standard() -> Self {
        Self::from_pairs(SYNONYMS)
    }

    pub fn resolve<'a>(&'a self, candidate: &'a str) -> &'a str {
        self.entries.get(candidate).map(String::as_str).unwrap_or(candidate)
    }
}
