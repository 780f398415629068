//! HTML page rendering
//!
//! Pages are built with `format!` around a shared layout. Every value that
//! comes from a database goes through [`escape`].

use ch_common::db::RowSet;
use ch_common::stats::Statistics;
use serde_json::Value;

use crate::pagination::PageMeta;

/// Navigation entries: (key, href, caption)
const NAV: [(&str, &str, &str); 4] = [
    ("index", "/", "Statistics"),
    ("actions", "/actions/1", "Actions"),
    ("documents", "/documents/1", "Documents"),
    ("export", "/export", "Export"),
];

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate),
        None => "N/A".to_string(),
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape(s),
        other => escape(&other.to_string()),
    }
}

/// Wrap `body` in the common page layout
pub fn layout(title: &str, active_page: &str, body: &str) -> String {
    let nav: String = NAV
        .iter()
        .map(|(key, href, caption)| {
            let class = if *key == active_page { " class=\"active\"" } else { "" };
            format!("<a href=\"{}\"{}>{}</a>", href, class, caption)
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; color: #222; }}
        header {{ background-color: #2a2a2a; padding: 12px 20px; }}
        header h1 {{ color: #4a9eff; font-size: 22px; margin: 0 0 8px 0; }}
        nav a {{ color: #ccc; margin-right: 16px; text-decoration: none; }}
        nav a.active {{ color: #fff; font-weight: 600; }}
        main {{ padding: 20px; }}
        table {{ border-collapse: collapse; margin-bottom: 20px; }}
        th, td {{ border: 1px solid #ddd; padding: 4px 8px; text-align: left; vertical-align: top; }}
        th {{ background-color: #f3f3f3; }}
        .pager a {{ margin-right: 8px; }}
        .pager a.current {{ font-weight: 700; }}
    </style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <nav>
            {nav}
        </nav>
    </header>
    <main>
{body}
    </main>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        body = body,
    )
}

/// Statistics (home) page body
pub fn statistics_body(stats: &Statistics, agreement_error: Option<&str>) -> String {
    let a = &stats.annotations;
    let mut body = format!(
        r#"        <h2>Documents</h2>
        <table>
            <tr><th>Annotated</th><th>Total</th><th>Completion</th></tr>
            <tr><td>{}</td><td>{}</td><td>{}</td></tr>
        </table>
"#,
        a.completed,
        a.count,
        format_rate(a.percentage)
    );

    body.push_str("        <h2>Annotators</h2>\n        <table>\n");
    body.push_str("            <tr><th>User</th><th>Completed</th><th>Total</th><th>Progress</th></tr>\n");
    if stats.users.is_empty() {
        body.push_str("            <tr><td colspan=\"4\">No annotators</td></tr>\n");
    }
    for user in &stats.users {
        body.push_str(&format!(
            "            <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&user.username),
            user.completed,
            user.total,
            format_rate(user.percentage)
        ));
    }
    body.push_str("        </table>\n");

    body.push_str("        <h2>Agreement</h2>\n");
    match agreement_error {
        Some(err) => body.push_str(&format!(
            "        <p>Agreement unavailable: {}</p>\n",
            escape(err)
        )),
        None => {
            body.push_str("        <table>\n");
            body.push_str("            <tr><th>Label</th><th>Documents</th><th>Majority reached</th><th>Rate</th></tr>\n");
            for row in &stats.agreement {
                body.push_str(&format!(
                    "            <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    escape(row.label.as_str()),
                    row.documents,
                    row.agreed,
                    format_rate(row.rate)
                ));
            }
            body.push_str("        </table>\n");
        }
    }

    body
}

/// Table of rows plus pager, linking pages under `base_path`
pub fn table_body(heading: &str, base_path: &str, rows: &RowSet, meta: &PageMeta) -> String {
    let mut body = format!(
        "        <h2>{}</h2>\n        <p>{} rows</p>\n        <table>\n            <tr>",
        escape(heading),
        meta.row_count
    );
    for column in &rows.columns {
        body.push_str(&format!("<th>{}</th>", escape(column)));
    }
    body.push_str("</tr>\n");
    for row in &rows.rows {
        body.push_str("            <tr>");
        for cell in row {
            body.push_str(&format!("<td>{}</td>", format_cell(cell)));
        }
        body.push_str("</tr>\n");
    }
    body.push_str("        </table>\n");
    body.push_str(&pager(base_path, meta));
    body
}

fn pager(base_path: &str, meta: &PageMeta) -> String {
    let mut links = Vec::new();
    if meta.has_prev {
        links.push(format!("<a href=\"{}/{}\">&laquo; Prev</a>", base_path, meta.prev));
    }
    for link in &meta.links {
        let class = if link.offset == meta.offset { " class=\"current\"" } else { "" };
        links.push(format!(
            "<a href=\"{}/{}\"{}>{}</a>",
            base_path, link.offset, class, link.number
        ));
    }
    if meta.has_next {
        links.push(format!("<a href=\"{}/{}\">Next &raquo;</a>", base_path, meta.next));
    }
    format!("        <div class=\"pager\">{}</div>\n", links.join(""))
}
