//! Turns raw model output into typed extraction results.
//!
//! Post output is plain text checked against the sentinel line. Profile output
//! is supposed to be a single JSON object but models regularly wrap it in
//! prose or code fences, so the object is recovered by trying a fixed list of
//! parse strategies in order.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use glimpse_core::{NormalizedProfile, PostExtraction, ProfileData, ProfileExtraction};

use crate::prompts::{NOT_A_POST_SENTINEL, NOT_A_PROFILE_SENTINEL};

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").expect("fenced block pattern is valid")
});

type ParseStrategy = fn(&str) -> Option<Value>;

/// Tried in order; the first one yielding a JSON object wins.
const PARSE_STRATEGIES: &[(&str, ParseStrategy)] = &[
    ("whole_text", parse_whole_text),
    ("fenced_block", parse_fenced_block),
    ("brace_span", parse_brace_span),
];

pub fn post(raw: &str) -> PostExtraction {
    if raw.contains(NOT_A_POST_SENTINEL) {
        tracing::info!("Model reported image is not a post");
        return PostExtraction::NotAPost;
    }
    PostExtraction::Text(raw.trim().to_string())
}

pub fn profile(raw: &str) -> ProfileExtraction {
    if let Some(sentinel) = embedded_error(raw) {
        return sentinel;
    }

    let Some(object) = recover_json_object(raw) else {
        tracing::warn!(raw_len = raw.len(), "Could not recover a JSON object from profile output");
        return ProfileExtraction::Unparseable;
    };

    if object.get("error").and_then(Value::as_str) == Some(NOT_A_PROFILE_SENTINEL) {
        tracing::info!("Model reported image is not a profile");
        return ProfileExtraction::NotAProfile;
    }

    ProfileExtraction::Profile(flatten_profile(object))
}

/// Advisory first pass: only looks at output that parses whole and has a
/// truthy `error` key. Anything else falls through to the regular parse,
/// which still recognizes the not-a-profile sentinel inside a recovered object.
fn embedded_error(raw: &str) -> Option<ProfileExtraction> {
    if !raw.contains("\"error\"") {
        return None;
    }

    let value: Value = serde_json::from_str(raw).ok()?;
    let error = value.get("error").filter(|e| is_truthy(e))?;

    let extraction = match error.as_str() {
        Some(NOT_A_PROFILE_SENTINEL) => {
            tracing::info!("Model reported image is not a profile");
            ProfileExtraction::NotAProfile
        }
        Some(message) => ProfileExtraction::ModelError(message.to_string()),
        None => ProfileExtraction::ModelError(error.to_string()),
    };
    Some(extraction)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn recover_json_object(raw: &str) -> Option<Value> {
    PARSE_STRATEGIES.iter().find_map(|(name, strategy)| {
        let value = strategy(raw)?;
        tracing::debug!(strategy = name, "Recovered profile JSON");
        Some(value)
    })
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

fn parse_whole_text(raw: &str) -> Option<Value> {
    parse_object(raw)
}

fn parse_fenced_block(raw: &str) -> Option<Value> {
    let interior = FENCED_BLOCK.captures(raw)?.get(1)?.as_str();
    parse_object(interior.trim())
}

fn parse_brace_span(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&raw[start..=end])
}

fn flatten_profile(raw_extraction: Value) -> NormalizedProfile {
    let profile_data = match raw_extraction.as_object() {
        Some(object) => ProfileData {
            headline: text_field(object, "headline"),
            about: text_field(object, "about"),
            experience: flatten_experience(object),
            skills: flatten_skills(object),
        },
        None => ProfileData::default(),
    };

    NormalizedProfile {
        profile_data,
        raw_extraction,
    }
}

fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Strings verbatim, null or absent as empty, other values as their JSON text.
fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders `experiences` as blank-line separated entries, falling back to a
/// pre-flattened `experiences` string or the legacy `experience` field.
fn flatten_experience(object: &Map<String, Value>) -> String {
    match object.get("experiences") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_object)
            .map(render_experience)
            .filter(|entry| !entry.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
        Some(Value::String(flat)) => flat.clone(),
        _ => object
            .get("experience")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

fn render_experience(entry: &Map<String, Value>) -> String {
    let title = string_field(entry, "title");
    let company = string_field(entry, "company");

    let heading = match (title, company) {
        (Some(title), Some(company)) => Some(format!("{title} at {company}")),
        (title, company) => title.or(company).map(str::to_string),
    };
    let duration = string_field(entry, "duration").map(|d| format!("({d})"));
    let description = string_field(entry, "description").map(str::to_string);

    [heading, duration, description]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins a `skills` array with `", "`. Strings are used as-is, nulls are
/// skipped and other values keep their JSON rendering.
fn flatten_skills(object: &Map<String, Value>) -> String {
    match object.get("skills") {
        Some(Value::Array(skills)) => skills
            .iter()
            .filter(|skill| !skill.is_null())
            .map(|skill| match skill {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(skills)) => skills.clone(),
        _ => String::new(),
    }
}
