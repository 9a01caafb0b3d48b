//! `renderUsage` functions for commands, virtual nodes, and the root.

use storm_reflection::quote;

use super::RUNTIME_MODULE;
use super::model::{DispatchRoute, UsageRow, column_width, pad, usage_rows, usage_line};
use super::writer::SourceWriter;
use crate::command::Command;
use crate::request::CommandRequest;

/// How the children of a node are listed in full usage output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildListing {
    /// No sub-commands.
    None,
    /// Name and description table.
    Table(Vec<DispatchRoute>),
    /// Each child's minimal usage, indented; the values are the local
    /// identifiers its `renderUsage` is imported as.
    Aggregated(Vec<String>),
}

/// Text content of one `renderUsage` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageText {
    /// Heading.
    pub title: String,
    /// Paragraph under the heading.
    pub description: String,
    /// Synopsis line.
    pub usage: String,
    /// Sub-command listing.
    pub children: ChildListing,
    /// Options table.
    pub rows: Vec<UsageRow>,
}

impl UsageText {
    /// Usage of a real command with the given flags and child routes.
    #[must_use]
    pub fn for_command(
        bin: &str,
        command: &Command,
        request: &CommandRequest,
        routes: Vec<DispatchRoute>,
    ) -> Self {
        let children = if routes.is_empty() {
            ChildListing::None
        } else {
            ChildListing::Table(routes)
        };
        Self {
            title: command.title.clone(),
            description: command.description.clone(),
            usage: usage_line(bin, Some(command), !matches!(children, ChildListing::None)),
            children,
            rows: usage_rows(request.args()),
        }
    }
}

/// Writes `export function renderUsage(mode)` for `text`.
pub fn write_render_usage(w: &mut SourceWriter, text: &UsageText, colors: bool) {
    let heading = |value: &str| {
        if colors {
            format!("colors.bold({})", quote(value))
        } else {
            quote(value)
        }
    };

    w.open("export function renderUsage(mode: \"full\" | \"minimal\" = \"full\"): string");
    w.line("const lines: string[] = [];");
    w.line(format!("lines.push({});", heading(&text.title)));
    if !text.description.is_empty() {
        w.line(format!("lines.push({});", quote(&text.description)));
    }
    w.line("lines.push(\"\");");
    w.line(format!("lines.push({});", heading("Usage:")));
    w.line(format!("lines.push({});", quote(&format!("  {}", text.usage))));
    w.open("if (mode === \"minimal\")");
    w.line("return lines.join(\"\\n\");");
    w.close();

    write_children(w, &text.children, &heading);
    if !text.rows.is_empty() {
        let width = column_width(&text.rows);
        w.line("lines.push(\"\");");
        w.line(format!("lines.push({});", heading("Options:")));
        for row in &text.rows {
            let cell = format!("  {}  {}", pad(&row.flags, width), row.description);
            w.line(format!("lines.push({});", quote(&cell)));
        }
    }
    w.line("return lines.join(\"\\n\");");
    w.close();
}

fn write_children(w: &mut SourceWriter, children: &ChildListing, heading: &dyn Fn(&str) -> String) {
    match children {
        ChildListing::None => {}
        ChildListing::Table(routes) => {
            let width = routes
                .iter()
                .map(|route| route.name.chars().count())
                .max()
                .unwrap_or(0);
            w.line("lines.push(\"\");");
            w.line(format!("lines.push({});", heading("Commands:")));
            for route in routes {
                let cell = format!("  {}  {}", pad(&route.name, width), route.description);
                w.line(format!("lines.push({});", quote(&cell)));
            }
        }
        ChildListing::Aggregated(renderers) => {
            let calls: Vec<String> = renderers
                .iter()
                .map(|renderer| format!("{renderer}(\"minimal\")"))
                .collect();
            w.line("lines.push(\"\");");
            w.line(format!("lines.push({});", heading("Commands:")));
            w.open(&format!("for (const block of [{}])", calls.join(", ")));
            w.line("lines.push(...block.split(\"\\n\").map((line) => `  ${line}`));");
            w.line("lines.push(\"\");");
            w.close();
        }
    }
}

/// Renders the `usage.ts` module of a real command.
#[must_use]
pub fn render_usage_module(text: &UsageText, colors: bool) -> String {
    let mut w = SourceWriter::module();
    if colors {
        w.line(format!("import {{ colors }} from {};", quote(RUNTIME_MODULE)));
        w.blank();
    }
    write_render_usage(&mut w, text, colors);
    w.finish()
}
