//! Display formatting shared by the renderers and the dashboard view.

use chrono::{DateTime, NaiveDate};

/// Maximum characters of research body text shown per citation.
pub const EXCERPT_CHARS: usize = 300;

/// Compact dollar amount: `$1.2M`, `$15.0K`, `$950`.
pub fn format_volume(v: f64) -> String {
    let v = if v.is_finite() { v } else { 0.0 };
    let abs = v.abs();
    if abs >= 1_000_000.0 {
        format!("${:.1}M", v / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("${:.1}K", v / 1_000.0)
    } else {
        format!("${v:.0}")
    }
}

/// Signed dollar amount with two decimals: `+$1.20`, `-$0.35`.
pub fn format_signed_usd(v: f64) -> String {
    let v = if v.is_finite() { v } else { 0.0 };
    if v < 0.0 {
        format!("-${:.2}", v.abs())
    } else {
        format!("+${v:.2}")
    }
}

/// Signed percentage from a fraction: 0.123 → `+12.3%`.
pub fn format_signed_pct(fraction: f64) -> String {
    let pct = if fraction.is_finite() { fraction * 100.0 } else { 0.0 };
    format!("{pct:+.1}%")
}

/// Countdown text from hours remaining: `45m`, `5h 30m`, `3d 4h`.
pub fn countdown(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "closed".to_string();
    }
    let total_minutes = (hours * 60.0).round() as i64;
    let days = total_minutes / (24 * 60);
    let h = (total_minutes % (24 * 60)) / 60;
    let m = total_minutes % 60;
    if days > 0 {
        format!("{days}d {h}h")
    } else if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

/// Date portion of a timestamp, without time-of-day.
pub fn date_only(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.to_string();
    }
    raw.split(['T', ' '])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Clamp a bar width into [0, 100].
pub fn clamp_width(w: f64) -> f64 {
    if w.is_finite() {
        w.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
