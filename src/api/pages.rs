// =============================================================================
// HTML Pages — server-rendered form and chart views
// =============================================================================
//
// Pages are assembled with `format!`; every user-controlled string passes
// through `escape_html` before it is interpolated.
// =============================================================================

use std::fmt::Write as _;

use crate::form::{
    FormErrors, FormValues, FIELD_FUNCTION, FIELD_INTERVAL, FIELD_SERIES_TYPE, FIELD_SYMBOL,
    SYMBOL_MAX_LEN,
};
use crate::pipeline::ChartView;
use crate::types::{Function, Interval, SeriesType};

const STYLE: &str = r#"
    body { font-family: sans-serif; max-width: 1080px; margin: 2rem auto; color: #222; }
    form p { margin: 0.6rem 0; }
    label { display: inline-block; width: 8rem; }
    .errorlist { color: #b00020; margin: 0.2rem 0 0 8rem; padding: 0; list-style: none; }
    .error { color: #b00020; font-weight: bold; }
    img { max-width: 100%; border: 1px solid #ddd; }
"#;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn error_list(errors: Option<&FormErrors>, field: &str) -> String {
    let Some(errors) = errors else {
        return String::new();
    };
    let msgs = errors.field(field);
    if msgs.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<ul class="errorlist">"#);
    for msg in msgs {
        let _ = write!(html, "<li>{}</li>", escape_html(msg));
    }
    html.push_str("</ul>");
    html
}

fn select<'a>(
    name: &str,
    label: &str,
    selected: &str,
    choices: impl IntoIterator<Item = (&'a str, &'a str)>,
    errors: Option<&FormErrors>,
) -> String {
    let mut options = String::new();
    for (value, text) in choices {
        let sel = if value == selected { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{v}"{sel}>{t}</option>"#,
            v = escape_html(value),
            t = escape_html(text),
        );
    }
    format!(
        r#"<p><label for="id_{name}">{label}:</label> <select name="{name}" id="id_{name}">{options}</select>{errs}</p>"#,
        errs = error_list(errors, name),
    )
}

/// The indicator form, optionally with field errors and a page-level message.
pub fn index_page(
    values: &FormValues,
    errors: Option<&FormErrors>,
    message: Option<&str>,
) -> String {
    let mut body = String::from("<h1>Technical Indicator Dashboard</h1>\n");

    if let Some(msg) = message {
        let _ = writeln!(body, r#"<p class="error">{}</p>"#, escape_html(msg));
    }

    body.push_str("<form method=\"post\" action=\"/\">\n");
    let _ = writeln!(
        body,
        r#"<p><label for="id_{FIELD_SYMBOL}">Stock Symbol:</label> <input type="text" name="{FIELD_SYMBOL}" id="id_{FIELD_SYMBOL}" maxlength="{SYMBOL_MAX_LEN}" value="{v}" required>{errs}</p>"#,
        v = escape_html(&values.symbol),
        errs = error_list(errors, FIELD_SYMBOL),
    );
    body.push_str(&select(
        FIELD_FUNCTION,
        "Function",
        &values.function,
        Function::ALL.iter().map(|f| (f.as_str(), f.as_str())),
        errors,
    ));
    body.push('\n');
    body.push_str(&select(
        FIELD_INTERVAL,
        "Interval",
        &values.interval,
        Interval::ALL.iter().map(|i| (i.as_str(), i.label())),
        errors,
    ));
    body.push('\n');
    body.push_str(&select(
        FIELD_SERIES_TYPE,
        "Series type",
        &values.series_type,
        SeriesType::ALL.iter().map(|s| (s.as_str(), s.label())),
        errors,
    ));
    body.push_str("\n<p><button type=\"submit\">Plot</button></p>\n</form>");

    layout("Technical Indicator Dashboard", &body)
}

/// The rendered chart with an inline base64 PNG.
pub fn chart_page(view: &ChartView) -> String {
    let title = escape_html(&view.title);
    let body = format!(
        r#"<h1>{title}</h1>
<p>Interval: {interval} &middot; Series type: {series_type}</p>
<img src="data:image/png;base64,{chart}" alt="{title}">
<p><a href="/">Plot another indicator</a></p>"#,
        interval = view.request.interval.label(),
        series_type = view.request.series_type.label(),
        chart = view.chart_base64,
    );
    layout(&view.title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b a="1">&'x'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;&amp;&#x27;x&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn default_form_selects_initials() {
        let html = index_page(&FormValues::default(), None, None);
        assert!(html.contains(r#"value="IBM""#));
        assert!(html.contains(r#"<option value="weekly" selected>Weekly</option>"#));
        assert!(html.contains(r#"<option value="close" selected>Close</option>"#));
        assert!(html.contains(r#"<option value="HT_PHASOR" selected>HT_PHASOR</option>"#));
        assert!(!html.contains(r#"<ul class="errorlist">"#));
    }

    #[test]
    fn field_errors_and_message_rendered() {
        let raw: HashMap<String, String> =
            [("symbol".to_string(), "<script>".to_string())].into_iter().collect();
        let errors = crate::form::validate(&raw).unwrap_err();
        let html = index_page(&FormValues::from_raw(&raw), Some(&errors), Some("Oops"));
        assert!(html.contains(r#"<p class="error">Oops</p>"#));
        assert!(html.contains("This field is required."));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
