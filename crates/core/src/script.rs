//! Ad script assembly from a short creative brief.

use serde::{Deserialize, Serialize};

/// Opening line used when the brief names no product.
pub const DEFAULT_PRODUCT_LINE: &str = "Amazing product for your day.";

/// Closing line used when the brief has no call to action.
pub const DEFAULT_CTA: &str = "Shop now!";

/// Free-text fields collected by the ad form. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdBrief {
    pub product: String,
    pub audience: String,
    pub goal: String,
    /// Visual direction notes.
    pub visual: String,
    pub cta: String,
}

/// Build a voiceover script, one sentence per line.
///
/// Order is product, audience, visual notes, goal, call to action. Blank
/// fields are dropped except product and CTA, which fall back to
/// [`DEFAULT_PRODUCT_LINE`] and [`DEFAULT_CTA`].
pub fn build_script(brief: &AdBrief) -> String {
    let product = brief.product.trim();
    let audience = brief.audience.trim();
    let cta = brief.cta.trim();

    let lines = [
        if product.is_empty() {
            DEFAULT_PRODUCT_LINE.to_string()
        } else {
            product.to_string()
        },
        if audience.is_empty() {
            String::new()
        } else {
            format!("Made for {audience}.")
        },
        brief.visual.trim().to_string(),
        brief.goal.trim().to_string(),
        if cta.is_empty() {
            DEFAULT_CTA.to_string()
        } else {
            cta.to_string()
        },
    ];

    lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
