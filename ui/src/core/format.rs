//! Formatting helpers for presenting metrics and filter state.

pub fn format_percent(value: f64) -> String {
    format!("{value:.1} %")
}

pub fn format_count(value: f64) -> String {
    format!("{value:.0}")
}

/// Compact summary of a multi-select filter, shown as the picker title.
pub fn picker_title(entity: &str, selected: usize, total: usize) -> String {
    if selected == total {
        format!("All {entity} ({selected})")
    } else if selected == 0 {
        format!("No {entity} (0 out of {total})")
    } else {
        format!("{selected} {entity} out of {total}")
    }
}
