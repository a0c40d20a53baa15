//! Scheme name normalization
//!
//! AMFI scheme names encode a fund's base name together with a distribution
//! plan and a payout variant, e.g. `SBI Bluechip Fund - Direct Plan - Growth`.
//! [`normalize`] splits such a name into a [`SchemeDescriptor`] so that
//! abbreviated names from user records can be compared with feed entries.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Display;

static PLAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(direct|regular)(\s+plan)?").unwrap());
static GROWTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)growth").unwrap());
static IDCW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)idcw").unwrap());
static IDCW_LONG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)income distribution cum capital withdrawal").unwrap());
static DIRECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)direct(\s+plan)?").unwrap());
static REGULAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)regular(\s+plan)?").unwrap());
static PLAN_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bplan\b").unwrap());
static HYPHEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\x{2013}\x{2014}]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const IDCW_LONG: &str = "income distribution cum capital withdrawal";

/// Distribution channel of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Direct,
    Regular,
    #[default]
    Unknown,
}

impl Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Plan::Direct => "direct",
                Plan::Regular => "regular",
                Plan::Unknown => "unknown",
            }
        )
    }
}

/// Payout option of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Growth,
    Idcw,
    #[default]
    Unknown,
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Variant::Growth => "growth",
                Variant::Idcw => "idcw",
                Variant::Unknown => "unknown",
            }
        )
    }
}

/// Structured form of a scheme name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SchemeDescriptor {
    /// Name with the detected plan and variant tokens removed. Keeps the
    /// casing of the input.
    pub base: String,
    pub plan: Plan,
    pub variant: Variant,
}

impl SchemeDescriptor {
    /// Returns a copy with `base` lowercased, the form used for matching.
    pub fn to_match_key(&self) -> SchemeDescriptor {
        SchemeDescriptor {
            base: self.base.to_lowercase(),
            plan: self.plan,
            variant: self.variant,
        }
    }

    /// Whether `self` (a feed entry) satisfies the constraints of `query`.
    ///
    /// Both descriptors are expected to carry lowercased bases. An unknown
    /// plan or variant on the query side matches anything.
    pub fn accepts(&self, query: &SchemeDescriptor) -> bool {
        self.base.contains(query.base.as_str())
            && (query.plan == Plan::Unknown || query.plan == self.plan)
            && (query.variant == Variant::Unknown || query.variant == self.variant)
    }
}

fn detect_variant(lower: &str) -> Variant {
    if lower.contains("growth") {
        Variant::Growth
    } else if lower.contains("idcw") || lower.contains(IDCW_LONG) {
        Variant::Idcw
    } else {
        Variant::Unknown
    }
}

fn detect_plan(lower: &str) -> Plan {
    // The last occurrence is the authoritative one
    match PLAN_RE.find_iter(lower).last() {
        Some(m) if m.as_str().starts_with("direct") => Plan::Direct,
        Some(m) if m.as_str().starts_with("regular") => Plan::Regular,
        _ => Plan::Unknown,
    }
}

/// Splits a raw scheme name into base name, plan and variant.
///
/// Only tokens for a detected plan or variant are stripped from the base;
/// words on an undetected axis are kept verbatim. Never fails: empty input
/// gives an empty base with unknown plan and variant.
pub fn normalize(raw_name: &str) -> SchemeDescriptor {
    let lower = raw_name.to_lowercase();
    let variant = detect_variant(&lower);
    let plan = detect_plan(&lower);

    let mut base = raw_name.to_string();

    match variant {
        Variant::Growth => {
            base = GROWTH_RE.replace_all(&base, "").into_owned();
        }
        Variant::Idcw => {
            base = IDCW_LONG_RE.replace_all(&base, "").into_owned();
            base = IDCW_RE.replace_all(&base, "").into_owned();
        }
        Variant::Unknown => {}
    }

    match plan {
        Plan::Direct => {
            base = DIRECT_RE.replace_all(&base, "").into_owned();
        }
        Plan::Regular => {
            base = REGULAR_RE.replace_all(&base, "").into_owned();
        }
        Plan::Unknown => {}
    }

    let base = PLAN_WORD_RE.replace_all(&base, "");
    let base = HYPHEN_RE.replace_all(&base, " ");
    let base = WHITESPACE_RE.replace_all(&base, " ");

    SchemeDescriptor {
        base: base.trim().to_string(),
        plan,
        variant,
    }
}
