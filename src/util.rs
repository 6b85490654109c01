/// `HH:MM:SS`, as shown on the countdown clock.
pub fn format_clock(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// `Xm Ys`, used for totals and averages.
pub fn format_minutes(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Like [`format_minutes`] but drops the minutes under one minute.
pub fn format_time_detail(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else {
        format_minutes(secs)
    }
}

/// `A`, `B`, `C`... for option positions. Positions past `Z` fall back to
/// their 1-based number.
pub fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

/// Formats marks without a trailing `.0` and with an explicit `+` for gains.
pub fn format_marks(marks: f64) -> String {
    let body = if marks.fract() == 0.0 {
        format!("{}", marks as i64)
    } else {
        format!("{marks}")
    };
    if marks > 0.0 {
        format!("+{body}")
    } else {
        body
    }
}
