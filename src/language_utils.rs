//! ISO language code helpers.
//!
//! The reshaping prompt names the spoken languages in plain English; the
//! configuration stores them as ISO 639-1 or 639-2 codes.

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn bibliographic_to_terminologic(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Resolve a 2- or 3-letter code to an isolang language
pub fn resolve_language(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(
            bibliographic_to_terminologic(&normalized).unwrap_or(&normalized),
        ),
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    Ok(resolve_language(code)?.to_name().to_string())
}

/// Describe the spoken languages for the prompt.
///
/// The first code is the main language; any others are marked as only
/// appearing occasionally, e.g. `["th", "en"]` gives "Thai, English (few words)".
pub fn describe_languages(codes: &[String]) -> Result<String> {
    let names = codes
        .iter()
        .map(|code| get_language_name(code))
        .collect::<Result<Vec<_>>>()?;

    match names.split_first() {
        None => Err(anyhow!("At least one language code is required")),
        Some((main, [])) => Ok(main.clone()),
        Some((main, others)) => Ok(format!("{}, {} (few words)", main, others.join(", "))),
    }
}
