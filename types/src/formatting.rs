//! Centralized display formatting utilities.
//!
//! All human-readable output of character reports goes through this module so
//! the worker's text mode and any future frontend agree on the same shapes.

/// Format a millisecond duration as `H:MM:SS`.
///
/// Negative durations are clamped to zero.
///
/// # Examples
/// ```
/// use pathlog_types::formatting::format_duration_ms;
/// assert_eq!(format_duration_ms(0), "0:00:00");
/// assert_eq!(format_duration_ms(125_000), "0:02:05");
/// assert_eq!(format_duration_ms(3_725_999), "1:02:05");
/// ```
pub fn format_duration_ms(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{}:{:02}:{:02}", hours, mins, secs)
}

/// Format a play-time span compactly for tables.
///
/// - Spans of a day or more: `Xd Yh`
/// - Spans of an hour or more: `Xh YYm`
/// - Shorter spans: `Xm`
///
/// # Examples
/// ```
/// use pathlog_types::formatting::format_playtime;
/// assert_eq!(format_playtime(90_000), "1m");
/// assert_eq!(format_playtime(3_900_000), "1h 05m");
/// assert_eq!(format_playtime(90_000_000), "1d 1h");
/// ```
pub fn format_playtime(ms: i64) -> String {
    let total_mins = ms.max(0) / 60_000;
    let days = total_mins / (24 * 60);
    let hours = (total_mins / 60) % 24;
    let mins = total_mins % 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {:02}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Format a character's level with its ascendancy, if known.
///
/// # Examples
/// ```
/// use pathlog_types::formatting::format_level;
/// assert_eq!(format_level(92, Some("Necromancer")), "92 Necromancer");
/// assert_eq!(format_level(1, None), "1");
/// ```
pub fn format_level(level: u8, ascendancy: Option<&str>) -> String {
    match ascendancy {
        Some(name) if !name.is_empty() => format!("{} {}", level, name),
        _ => level.to_string(),
    }
}

/// Format an inclusive level window, collapsing single levels.
///
/// # Examples
/// ```
/// use pathlog_types::formatting::format_level_range;
/// assert_eq!(format_level_range(1, 100), "1-100");
/// assert_eq!(format_level_range(68, 68), "68");
/// ```
pub fn format_level_range(from: u8, to: u8) -> String {
    if from == to {
        from.to_string()
    } else {
        format!("{}-{}", from, to)
    }
}
