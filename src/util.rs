use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seconds rendered as milliseconds with grouped thousands, e.g. `12,500.00ms`.
pub fn format_duration(secs: f64) -> String {
    if !secs.is_finite() {
        return "-".to_owned();
    }

    let millis = format!("{:.2}", (secs * 1000.0).abs());
    let (whole, fraction) = millis.split_once('.').unwrap_or((millis.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if secs < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}ms")
}

/// Leading characters of a hex id, enough to tell spans apart on screen.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Hash that stays the same for the same input within a build.
pub fn stable_hash(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hue in `[0, 1)` derived from `value`.
pub fn stable_hue(value: &str) -> f32 {
    ((stable_hash(value) & 0xffff_ffff) as f64 / (u64::from(u32::MAX) + 1) as f64) as f32
}
