use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use finbot_core::{capitalize_first, default_date, guess_category, Money, RecordKind};

// Brazilian thousands-dot/decimal-comma amount, e.g. "1.900,00" or "150,5".
static VALUE_BR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:\.\d{3})*,\d{1,2}").unwrap());
// Plain amount with dot as the decimal point, e.g. "1900" or "49.90".
static VALUE_PLAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d{1,2})?").unwrap());

static DATE_DMY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").unwrap());
// DD/MM followed by a capture of any trailing digit, used to reject partial
// matches inside longer numbers (the regex crate has no lookahead).
static DATE_DM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})(\d?)").unwrap());
static DATE_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());

static RECORD_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Ordered removal pipeline for description extraction: command verbs, kind
/// nouns with connective prepositions, value phrases, bare numbers,
/// politeness fillers, date phrases, bare dates. The order is significant:
/// numbers must outlive the verb pass so "por 50" strips cleanly.
static STRIP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^(adicionar?|incluir?|lançar?|lancar?|registrar?|colocar?|por|botar?|nova?|novo?)\s+",
        r"(?i)(despesa|receita|gasto|conta|entrada|renda)\s*(de|do|da)?\s*",
        r"(?i)(no valor de|valor|de)\s*r?\$?\s*[\d.,]+",
        r"(?i)r?\$\s*[\d.,]+",
        r"[\d.,]+\s*(?:reais|real)?",
        r"(?i)(por favor|pf|pfv|please)",
        r"(?i)(vencimento|vence|para|em|dia)\s*\d{1,2}[/\-]\d{1,2}(?:[/\-]\d{2,4})?",
        r"\d{1,2}/\d{1,2}(?:/\d{2,4})?",
        r"\d{4}-\d{2}-\d{2}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Structured fields pulled out of one free-text message. Category and
/// description always resolve; value and date stay optional for the
/// dispatcher to demand or default.
#[derive(Debug, Clone)]
pub struct ExtractedEntities {
    pub value: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category: String,
    pub description: String,
}

pub fn extract_entities(text: &str, kind: RecordKind) -> ExtractedEntities {
    ExtractedEntities {
        value: extract_value(text),
        date: extract_date(text),
        category: guess_category(kind, text).to_string(),
        description: extract_description(text, kind.noun()),
    }
}

/// First monetary amount in the text, scanning left to right. The localized
/// pattern wins over the plain one.
pub fn extract_value(text: &str) -> Option<Money> {
    let text = text.replace("R$", "").replace("r$", "");
    if let Some(m) = VALUE_BR.find(&text) {
        return Money::parse_br(m.as_str());
    }
    if let Some(m) = VALUE_PLAIN.find(&text) {
        return Money::parse_br(m.as_str());
    }
    None
}

pub fn extract_date(text: &str) -> Option<NaiveDate> {
    extract_date_with_today(text, default_date())
}

/// `DD/MM/YYYY`, then `DD/MM` (current year), then `YYYY-MM-DD`; each
/// candidate is calendar-validated and falls through on failure.
pub fn extract_date_with_today(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(c) = DATE_DMY.captures(text) {
        let (d, m, y) = (num(&c, 1), num(&c, 2), num(&c, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32) {
            return Some(date);
        }
    }
    if let Some(c) = DATE_DM.captures(text) {
        // A trailing digit means this was a slice of a longer number.
        if c.get(3).map_or(true, |g| g.as_str().is_empty()) {
            let (d, m) = (num(&c, 1), num(&c, 2));
            if let Some(date) = NaiveDate::from_ymd_opt(today.year(), m as u32, d as u32) {
                return Some(date);
            }
        }
    }
    if let Some(c) = DATE_ISO.captures(text) {
        let (y, m, d) = (num(&c, 1), num(&c, 2), num(&c, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32) {
            return Some(date);
        }
    }
    None
}

/// First run of digits, read as a record id.
pub fn extract_record_id(text: &str) -> Option<i64> {
    RECORD_ID.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Strips command words, amounts and dates from the raw message, leaving the
/// user's own words as the description. Falls back to the capitalized kind
/// noun when nothing survives.
pub fn extract_description(text: &str, kind_noun: &str) -> String {
    let mut desc = text.to_string();
    for pattern in STRIP_PATTERNS.iter() {
        desc = pattern.replace_all(&desc, " ").into_owned();
    }
    let desc = WHITESPACE.replace_all(&desc, " ");
    let desc = desc
        .trim()
        .trim_matches(['-', ' ', ',', ';', ':', '.', '!', '?']);
    if desc.is_empty() {
        capitalize_first(kind_noun)
    } else {
        capitalize_first(desc)
    }
}

fn num(captures: &regex::Captures<'_>, group: usize) -> i64 {
    captures
        .get(group)
        .and_then(|g| g.as_str().parse().ok())
        .unwrap_or(0)
}
