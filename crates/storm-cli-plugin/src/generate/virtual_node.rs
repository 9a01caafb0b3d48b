//! Entry module of a virtual command: dispatch to children and their
//! aggregated usage.

use storm_reflection::quote;

use super::RUNTIME_MODULE;
use super::handler::{write_dispatch, write_parse};
use super::model::{DispatchRoute, ParserModel, usage_line, usage_rows};
use super::usage::{ChildListing, UsageText, write_render_usage};
use super::writer::SourceWriter;
use crate::command::Command;
use crate::naming::pascal_case;
use crate::request::{CommandRequest, HELP, VERSION};

/// Everything the entry module of one virtual command is rendered from.
#[derive(Debug)]
pub struct VirtualModule<'a> {
    /// Primary executable name.
    pub bin: &'a str,
    /// Application version printed by `--version`.
    pub version: &'a str,
    /// The virtual command.
    pub command: &'a Command,
    /// Its built-in flags.
    pub request: &'a CommandRequest,
    /// Children, in dispatch order.
    pub routes: &'a [DispatchRoute],
    /// Whether headings are coloured.
    pub colors: bool,
}

impl VirtualModule<'_> {
    /// Renders the module text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut w = SourceWriter::module();
        let mut runtime = vec!["parseArgs", "writeError"];
        if self.colors {
            runtime.insert(0, "colors");
        }
        w.line(format!(
            "import {{ {} }} from {};",
            runtime.join(", "),
            quote(RUNTIME_MODULE)
        ));
        let renderers = write_usage_imports(&mut w, self.routes);
        w.blank();
        w.line(format!("const VERSION = {};", quote(self.version)));
        w.line(format!("const DEPTH = {};", self.command.depth()));
        w.blank();

        let text = UsageText {
            title: self.command.title.clone(),
            description: self.command.description.clone(),
            usage: usage_line(self.bin, Some(self.command), true),
            children: ChildListing::Aggregated(renderers),
            rows: usage_rows(self.request.args()),
        };
        write_render_usage(&mut w, &text, self.colors);
        w.blank();
        w.open(
            "export async function main(argv: string[] = process.argv.slice(2 + DEPTH)): Promise<void>",
        );
        write_dispatch(&mut w, self.routes);
        write_parse(&mut w, &ParserModel::from_args(self.request.args()));
        write_fallthrough(&mut w);
        w.close();
        w.finish()
    }
}

/// Imports each route's `renderUsage` under a distinct local name and
/// returns those names in route order.
pub fn write_usage_imports(w: &mut SourceWriter, routes: &[DispatchRoute]) -> Vec<String> {
    routes
        .iter()
        .map(|route| {
            let local = format!("render{}Usage", pascal_case(&route.name));
            w.line(format!(
                "import {{ renderUsage as {local} }} from {};",
                quote(&route.usage_module)
            ));
            local
        })
        .collect()
}

/// Version, unknown-token, and usage handling shared by every dispatcher.
pub fn write_fallthrough(w: &mut SourceWriter) {
    w.open(&format!("if (args[{}] === true)", quote(VERSION)));
    w.line("console.log(VERSION);");
    w.line("return;");
    w.close();
    w.open(&format!(
        "if (args._.length > 0 && args[{}] !== true)",
        quote(HELP)
    ));
    w.line("writeError(`Unknown command \"${String(args._[0])}\"`);");
    w.line("console.log(renderUsage(\"full\"));");
    w.line("process.exitCode = 1;");
    w.line("return;");
    w.close();
    w.line("console.log(renderUsage(\"full\"));");
}
