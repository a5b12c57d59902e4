//! Formatting utilities

/// Format accumulated focus time: `"1h 15m"` from one hour up, else `"15m"`
pub fn duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Format a countdown as MM:SS
pub fn clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Render a fixed-width progress bar for a 0-100 percentage
pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((width as f64) * percent / 100.0).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(width - filled))
}

/// Truncate a string to max length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        assert_eq!(duration(4500), "1h 15m");
        assert_eq!(duration(900), "15m");
        assert_eq!(duration(0), "0m");
        assert_eq!(duration(59), "0m");
        assert_eq!(duration(3600), "1h 0m");
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(25 * 60), "25:00");
        assert_eq!(clock(61), "01:01");
        assert_eq!(clock(0), "00:00");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "\u{2591}".repeat(4));
        assert_eq!(progress_bar(100.0, 4), "\u{2588}".repeat(4));
        assert_eq!(progress_bar(50.0, 4).chars().filter(|c| *c == '\u{2588}').count(), 2);
        assert_eq!(progress_bar(250.0, 4), "\u{2588}".repeat(4));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Write the quarterly report", 10), "Write t...");
        assert_eq!(truncate("abcdef", 2), "...");
    }
}
