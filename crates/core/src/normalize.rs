//! Normalization of loosely-specified UI inputs into provider parameters.
//!
//! Every function here is total: unrecognized input resolves to a safe
//! default instead of an error, so the same input always yields the same
//! provider request.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Aspect ratios
-------------------------------------------------------------------------- */

/// Vertical 9:16, the default when nothing else matches.
pub const RATIO_PORTRAIT: &str = "720:1280";
/// Vertical 9:16 at full HD.
pub const RATIO_PORTRAIT_HD: &str = "1080:1920";
/// Horizontal 16:9.
pub const RATIO_LANDSCAPE: &str = "1280:720";
/// Horizontal 16:9 at full HD.
pub const RATIO_LANDSCAPE_HD: &str = "1920:1080";
/// Square.
pub const RATIO_SQUARE: &str = "1024:1024";
/// Square at 1080.
pub const RATIO_SQUARE_HD: &str = "1080:1080";

/// Ratio tokens the provider accepts.
pub const ALLOWED_RATIOS: &[&str] = &[
    RATIO_PORTRAIT,
    RATIO_PORTRAIT_HD,
    RATIO_LANDSCAPE,
    RATIO_LANDSCAPE_HD,
    RATIO_SQUARE,
    RATIO_SQUARE_HD,
];

/// UI label substrings and the token each maps to. Checked in order.
const RATIO_LABELS: &[(&[&str], &str)] = &[
    (&["9:16", "reel", "story", "portrait"], RATIO_PORTRAIT),
    (&["16:9", "landscape", "youtube", "tiktok"], RATIO_LANDSCAPE),
    (&["1:1", "square"], RATIO_SQUARE),
];

static RAW_DIMENSIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3,4})\s*[:x]\s*(\d{3,4})").expect("valid regex"));

/// Map a free-form ratio description to an allow-listed ratio token.
///
/// Label matches ("Reel/Story (9:16)", "landscape", "square") win over raw
/// `W:H` / `WxH` dimensions; raw dimensions are only accepted when they
/// are already allow-listed. Anything else resolves to [`RATIO_PORTRAIT`].
pub fn normalize_ratio(input: &str) -> &'static str {
    let s = input.to_lowercase();

    for (labels, token) in RATIO_LABELS {
        if labels.iter().any(|label| s.contains(label)) {
            return token;
        }
    }

    if let Some(caps) = RAW_DIMENSIONS_RE.captures(&s) {
        let candidate = format!("{}:{}", &caps[1], &caps[2]);
        if let Some(token) = ALLOWED_RATIOS.iter().find(|t| **t == candidate) {
            return token;
        }
    }

    RATIO_PORTRAIT
}

/// Whether `token` is one of the provider's accepted ratio tokens.
pub fn is_allowed_ratio(token: &str) -> bool {
    ALLOWED_RATIOS.contains(&token)
}

/* --------------------------------------------------------------------------
Models
-------------------------------------------------------------------------- */

/// The only video model requests are sent with.
pub const VIDEO_MODEL: &str = "gen4_turbo";

/// Model used to generate seed images from text.
pub const IMAGE_MODEL: &str = "gen4_image";

/// Model family substrings and the canonical model each resolves to.
///
/// The gen3 family is no longer served by the provider, so requests for it
/// are upgraded rather than rejected.
const MODEL_FAMILIES: &[(&str, &str)] = &[("gen4", VIDEO_MODEL), ("gen3", VIDEO_MODEL)];

/// Map any model-name variant to the canonical video model identifier.
///
/// Separators are ignored when matching, so `gen-3-alpha`, `Gen3 Alpha
/// Turbo` and `gen4_turbo` all resolve. Idempotent.
pub fn normalize_model(input: &str) -> &'static str {
    let compact: String = input
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect();

    for (family, canonical) in MODEL_FAMILIES {
        if compact.contains(family) {
            if *family != "gen4" {
                tracing::debug!(requested = input, model = canonical, "Upgrading model request");
            }
            return canonical;
        }
    }

    VIDEO_MODEL
}

/* --------------------------------------------------------------------------
Duration
-------------------------------------------------------------------------- */

/// Longest clip the provider will render, in seconds.
pub const MAX_DURATION_SECS: u32 = 10;

/// Duration used when the caller gives none (or nonsense).
pub const DEFAULT_DURATION_SECS: u32 = 5;

/// Clamp a caller-supplied duration to `1..=MAX_DURATION_SECS`.
///
/// Accepts JSON numbers and numeric strings (HTML form values arrive as
/// strings). Fractions round up to whole seconds. Missing, non-positive or
/// unparsable values yield [`DEFAULT_DURATION_SECS`].
pub fn clamp_duration(raw: Option<&Value>) -> u32 {
    let secs = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match secs {
        Some(s) if s.is_finite() && s > 0.0 => {
            (s.ceil().min(MAX_DURATION_SECS as f64)) as u32
        }
        _ => DEFAULT_DURATION_SECS,
    }
}

/* --------------------------------------------------------------------------
Request validation
-------------------------------------------------------------------------- */

/// A text-to-image request needs a prompt.
pub fn validate_image_prompt(prompt_text: &str) -> Result<(), CoreError> {
    if prompt_text.trim().is_empty() {
        return Err(CoreError::Validation("Missing promptText".to_string()));
    }
    Ok(())
}

/// A video request needs either a seed image or a prompt to generate one from.
pub fn validate_video_inputs(
    prompt_text: &str,
    prompt_image: Option<&str>,
) -> Result<(), CoreError> {
    let has_image = prompt_image.is_some_and(|url| !url.trim().is_empty());
    if !has_image && prompt_text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Provide promptText or promptImage".to_string(),
        ));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
