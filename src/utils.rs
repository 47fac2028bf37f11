use chrono::Duration;

/// Format a build duration as `45s`, `3m 07s` or `1h 02m 03s`.
pub fn format_duration(duration: Option<Duration>) -> String {
    let Some(duration) = duration else {
        return "unknown duration".to_string();
    };

    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Returns true if the trigger name marks a deploy job.
pub fn is_deploy_trigger(trigger_name: Option<&str>, keyword: &str) -> bool {
    trigger_name
        .map(|name| name.to_lowercase().contains(&keyword.to_lowercase()))
        .unwrap_or(false)
}

/// Quote a value as a MySQL backtick identifier. Backslashes are literal
/// inside backticks, so the result does not depend on `NO_BACKSLASH_ESCAPES`.
pub fn quote_sql_identifier(value: &str) -> String {
    format!("`{}`", value.replace('`', "``"))
}
