/// Render a seconds count as `HH:MM:SS`.
///
/// Fractions are floored. NaN and negative input render as `00:00:00`;
/// hours keep growing past 24.
pub fn format_duration(total_secs: f64) -> String {
    let total = total_secs.floor();
    if total.is_nan() || total < 0.0 {
        return "00:00:00".to_string();
    }
    let total = total as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
