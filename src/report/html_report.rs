//! @ai:module:intent Minimal HTML rendering of result tables
//! @ai:module:layer infrastructure
//! @ai:module:public_api HtmlReporter
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::table::Table;
use std::path::Path;

/// @ai:intent Trait for HTML table rendering
pub trait HtmlReporterTrait: Send + Sync {
    /// @ai:intent Render a table as an HTML document
    fn render(&self, table: &Table, title: &str) -> String;

    /// @ai:intent Render a table and write it to output_path
    fn generate(&self, table: &Table, title: &str, output_path: &Path) -> Result<()>;
}

/// @ai:intent Writes tables as unstyled HTML with the same content as the CSV output
pub struct HtmlReporter;

impl HtmlReporter {
    /// @ai:intent Create a new HTML reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    fn header_row(label: &str, cells: impl IntoIterator<Item = String>) -> String {
        let mut row = format!("<tr><th>{}</th>", escape(label));
        for cell in cells {
            row.push_str(&format!("<th>{}</th>", escape(&cell)));
        }
        row.push_str("</tr>\n");
        row
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlReporterTrait for HtmlReporter {
    /// @ai:effects pure
    fn render(&self, table: &Table, title: &str) -> String {
        let prefix = table.common_prefix();
        let columns = || {
            table
                .groups
                .iter()
                .flat_map(|g| g.columns.iter().map(move |c| (g, c)))
        };

        let mut output = String::new();
        output.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        output.push_str(&format!("<title>{}</title>\n", escape(title)));
        output.push_str("</head>\n<body>\n<table>\n<thead>\n");

        output.push_str(&Self::header_row(
            "tool",
            columns().map(|(g, _)| g.tool.clone()),
        ));
        output.push_str(&Self::header_row(
            "run set",
            columns().map(|(g, _)| g.run_set.clone()),
        ));
        output.push_str(&Self::header_row(&prefix, columns().map(|(_, c)| c.header())));
        output.push_str("</thead>\n<tbody>\n");

        for row in &table.rows {
            let identifier = row
                .identifier
                .strip_prefix(prefix.as_str())
                .unwrap_or(&row.identifier);
            output.push_str(&format!("<tr><td>{}</td>", escape(identifier)));

            for (group, result) in table.groups.iter().zip(&row.results) {
                match result {
                    Some(result) => {
                        let class = if result.correct { "correct" } else { "other" };
                        for value in &result.values {
                            output.push_str(&format!(
                                "<td class=\"{}\">{}</td>",
                                class,
                                escape(value)
                            ));
                        }
                    }
                    None => {
                        for _ in &group.columns {
                            output.push_str("<td></td>");
                        }
                    }
                }
            }

            output.push_str("</tr>\n");
        }

        output.push_str("</tbody>\n</table>\n</body>\n</html>\n");
        output
    }

    /// @ai:effects fs:write
    fn generate(&self, table: &Table, title: &str, output_path: &Path) -> Result<()> {
        std::fs::write(output_path, self.render(table, title)).map_err(|source| {
            Error::FileWrite {
                path: output_path.to_path_buf(),
                source,
            }
        })
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
