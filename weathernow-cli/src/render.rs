use std::fmt::Write as _;

use weathernow_core::SessionState;

/// Human-readable view of the session: the error, or the record and its summary.
pub fn format_state(state: &SessionState, icon_base_url: &str) -> String {
    if let Some(error) = &state.error {
        return error.clone();
    }

    let Some(record) = &state.record else {
        return String::new();
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", record.city);
    let _ = writeln!(out, "  {}°C, {}", record.temperature_c, title_case(&record.description));
    let _ = writeln!(out, "  Humidity:   {}%", record.humidity_pct);
    let _ = writeln!(out, "  Wind speed: {} km/h", record.wind_speed_kmh);
    let _ = write!(out, "  Icon:       {}", record.icon_url(icon_base_url));

    if state.is_summarizing {
        out.push_str("\n\n  Generating summary...");
    } else if let Some(summary) = &state.summary {
        let _ = write!(out, "\n\n  \"{summary}\"");
    }

    out
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
