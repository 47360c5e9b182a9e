//! Clock-style durations for course episodes.

/// Format `seconds` as `HH:MM:SS`, rounding to the nearest second.
///
/// Hours are not wrapped at 24; negative or non-finite input yields
/// `00:00:00`.
///
/// # Examples
/// ```
/// use campus::domain::duration::format_duration;
///
/// assert_eq!(format_duration(3_725.4), "01:02:05");
/// assert_eq!(format_duration(90_000.0), "25:00:00");
/// ```
pub fn format_duration(seconds: f64) -> String {
    // `as` saturates, so huge values clamp to u64::MAX.
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    format_seconds(whole)
}

fn format_seconds(total: u64) -> String {
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Parse `HH:MM:SS` or `MM:SS` into seconds.
///
/// Returns `None` for anything else, including values too large for `u64`.
pub fn parse_clock(value: &str) -> Option<u64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    let numbers = parts
        .iter()
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    let (hours, minutes, seconds) = match numbers.as_slice() {
        [hours, minutes, seconds] => (*hours, *minutes, *seconds),
        [minutes, seconds] => (0, *minutes, *seconds),
        _ => return None,
    };
    hours
        .checked_mul(3_600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Sum clock-style durations; unparseable entries count as zero and the
/// total saturates at `u64::MAX` seconds.
pub fn total_time<'a>(times: impl IntoIterator<Item = &'a str>) -> String {
    let total = times
        .into_iter()
        .map(|time| parse_clock(time).unwrap_or(0))
        .fold(0_u64, u64::saturating_add);
    format_seconds(total)
}
