use pulse_core::RollingWindow;

/// Text shown next to a graph title.
///
/// The latest value rounded to a whole number with its unit, or `--` while
/// the window is empty or the newest tick carried no data.
pub fn format_readout(window: &RollingWindow, unit: &str) -> String {
    match window.latest() {
        Some(v) if window.is_valid() => format!("{} {unit}", v.round()),
        _ => String::from("--"),
    }
}

/// Full header line, e.g. `Heart Rate: 72 BPM`.
pub fn header_text(title: &str, window: &RollingWindow, unit: &str) -> String {
    format!("{title}: {}", format_readout(window, unit))
}
