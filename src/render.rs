//! Output formats for [`SearchResponse`].

use crate::search::SearchResponse;

/// Cell values longer than this many characters are cut in markdown output.
pub const MAX_VALUE_CHARS: usize = 400;

fn truncate_value(value: &str) -> String {
    match value.char_indices().nth(MAX_VALUE_CHARS) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

/// Compact markdown listing of the results.
pub fn markdown(resp: &SearchResponse) -> String {
    let mut lines: Vec<String> = Vec::new();
    match &resp.stack {
        Some(stack) => {
            lines.push("## Auth Skill Stack Guidelines".to_string());
            lines.push(format!("**Stack:** {} | **Query:** {}", stack, resp.query));
        }
        None => {
            lines.push("## Auth Skill Search Results".to_string());
            lines.push(format!(
                "**Domain:** {} | **Query:** {}",
                resp.domain, resp.query
            ));
        }
    }
    lines.push(format!(
        "**Source:** {} | **Found:** {} results\n",
        resp.file, resp.count
    ));

    for (i, row) in resp.results.iter().enumerate() {
        lines.push(format!("### Result {}", i + 1));
        for (column, value) in row.iter() {
            lines.push(format!("- **{}:** {}", column, truncate_value(value)));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Pretty-printed JSON.
pub fn json(resp: &SearchResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(resp)
}
