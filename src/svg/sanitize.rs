use once_cell::sync::Lazy;
use regex_lite::Regex;

pub const DEFAULT_COLOR: &str = "#000000";
pub const DEFAULT_RADIUS: f64 = 0.5;
const MAX_RADIUS: f64 = 1000.0;

static COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(",
        r"#[0-9A-Fa-f]{3,6}",
        r"|rgb\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*\)",
        r"|rgba\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*,\s*[\d.]+\s*\)",
        r"|hsl\(\s*\d+\s*,\s*\d+%\s*,\s*\d+%\s*\)",
        r"|hsla\(\s*\d+\s*,\s*\d+%\s*,\s*\d+%\s*,\s*[\d.]+\s*\)",
        r"|transparent|currentColor|inherit|[a-zA-Z]+",
        r")$"
    ))
    .expect("color pattern is valid")
});

/// Pass an allow-listed CSS color through (trimmed), anything else becomes
/// `#000000`. Output never carries markup from the input.
pub fn sanitize_color(color: &str) -> String {
    let trimmed = color.trim();
    if COLOR.is_match(trimmed) {
        trimmed.to_string()
    } else {
        DEFAULT_COLOR.to_string()
    }
}

/// Radii outside `0..=1000` or non-finite fall back to `0.5`
pub fn sanitize_radius(radius: f64) -> f64 {
    if radius.is_finite() && (0.0..=MAX_RADIUS).contains(&radius) {
        radius
    } else {
        DEFAULT_RADIUS
    }
}

pub fn sanitize_coordinate(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
