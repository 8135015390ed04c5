use std::fmt::Write;
use std::time::Duration;

/// Values interpolated into the visitor page
pub struct PageView<'a> {
    pub ip: &'a str,
    pub city: &'a str,
    pub detected: bool,
    pub default_city: &'a str,
    pub weather: &'a str,
    pub cached: bool,
    pub ttl_remaining: Duration,
}

pub fn render(view: &PageView<'_>) -> String {
    let message = if view.detected {
        String::new()
    } else {
        format!(
            "(Location could not be determined, using {} as default)",
            escape_html(view.default_city)
        )
    };

    let cache_info = if view.cached {
        format!(
            "(Cached data, TTL remaining: {})",
            format_ttl(view.ttl_remaining)
        )
    } else {
        String::new()
    };

    format!(
        r#"<html>
<head><title>Weather</title><meta charset="UTF-8"></head>
<body>
    <h1>Your IP: {ip}</h1>
    <h2>Weather in {city} {message}</h2>
    <p>{weather} {cache_info}</p>
</body>
</html>
"#,
        ip = escape_html(view.ip),
        city = escape_html(view.city),
        weather = escape_html(view.weather),
    )
}

/// Whole-second duration in `1h2m3s` form, rounding half up
pub fn format_ttl(ttl: Duration) -> String {
    let total = (ttl.as_millis() + 500) / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h{minutes}m{seconds}s");
    } else if minutes > 0 {
        let _ = write!(out, "{minutes}m{seconds}s");
    } else {
        let _ = write!(out, "{seconds}s");
    }
    out
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
