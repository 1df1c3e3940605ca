use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::dto::DayPlan;

lazy_static! {
    static ref OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    static ref LINE_COMMENT_RE: Regex = Regex::new(r"//[^\n]*").unwrap();
    static ref TRAILING_BRACE_RE: Regex = Regex::new(r",\s*\}").unwrap();
    static ref TRAILING_BRACKET_RE: Regex = Regex::new(r",\s*\]").unwrap();
}

#[derive(Debug, Deserialize)]
struct PlanEnvelope {
    days: Vec<DayPlan>,
}

/// Pulls the `days` array out of a model answer that may wrap the JSON
/// object in prose or code fences.
pub fn extract_days(content: &str) -> anyhow::Result<Vec<DayPlan>> {
    let raw = OBJECT_RE
        .find(content)
        .map(|m| m.as_str())
        .context("no JSON object in model answer")?;

    match serde_json::from_str::<PlanEnvelope>(raw) {
        Ok(env) => return Ok(env.days),
        Err(e) => debug!(error = %e, "raw model JSON rejected; cleaning"),
    }

    let cleaned = clean_json(raw);
    let env = serde_json::from_str::<PlanEnvelope>(&cleaned).map_err(|e| {
        warn!(error = %e, cleaned = %cleaned, "cleaned model JSON rejected");
        anyhow::anyhow!(e)
    })?;
    Ok(env.days)
}

/// Repairs the usual ways a model bends JSON.
///
/// Quote swapping is lossy for apostrophes inside strings, so this only runs
/// after the untouched text failed to parse.
pub fn clean_json(raw: &str) -> String {
    let s = LINE_COMMENT_RE.replace_all(raw, "");
    let s = s.replace('\'', "\"");
    let s = TRAILING_BRACE_RE.replace_all(&s, "}");
    let s = TRAILING_BRACKET_RE.replace_all(&s, "]");
    s.into_owned()
}
