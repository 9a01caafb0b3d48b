//! The executable entry: banner, completions, and top-level dispatch.

use std::collections::BTreeMap;

use storm_reflection::quote;

use super::RUNTIME_MODULE;
use super::completions::{GET_COMPLETIONS_FLAG, Shell};
use super::handler::{write_dispatch, write_parse};
use super::model::{DispatchRoute, ParserModel, usage_line, usage_rows};
use super::usage::{ChildListing, UsageText, write_render_usage};
use super::virtual_node::{write_fallthrough, write_usage_imports};
use super::writer::{GENERATED_HEADER, SourceWriter};
use crate::command::Command;
use crate::naming::{dynamic_parameter, flag_name};
use crate::options::CliOptions;
use crate::request::{CommandRequest, NO_BANNER};

/// Name of the reserved sub-command printing completion scripts.
pub const COMPLETIONS_COMMAND: &str = "completions";

/// Everything the executable entry is rendered from.
#[derive(Debug)]
pub struct RootModule<'a> {
    /// Application settings.
    pub options: &'a CliOptions,
    /// Built-in flags of the root.
    pub request: &'a CommandRequest,
    /// Top-level commands.
    pub routes: &'a [DispatchRoute],
    /// Import specifier of the root handler, when one exists.
    pub handler_module: Option<String>,
    /// Completion candidates keyed by space-separated command path.
    pub completions: &'a BTreeMap<String, Vec<String>>,
}

impl RootModule<'_> {
    /// Renders the module text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut w = SourceWriter::default();
        w.line("#!/usr/bin/env node");
        w.line(GENERATED_HEADER);
        w.blank();
        let mut runtime = vec!["parseArgs", "renderBanner", "writeError"];
        if self.options.colors {
            runtime.insert(0, "colors");
        }
        w.line(format!(
            "import {{ {} }} from {};",
            runtime.join(", "),
            quote(RUNTIME_MODULE)
        ));
        let renderers = write_usage_imports(&mut w, self.routes);
        w.blank();
        w.line(format!("const VERSION = {};", quote(&self.options.version)));
        w.blank();
        self.write_completion_table(&mut w);
        w.blank();

        let text = UsageText {
            title: self.options.title.clone(),
            description: self.options.description.clone(),
            usage: usage_line(self.options.primary_bin(), None, !self.routes.is_empty()),
            children: if renderers.is_empty() {
                ChildListing::None
            } else {
                ChildListing::Aggregated(renderers)
            },
            rows: usage_rows(self.request.args()),
        };
        write_render_usage(&mut w, &text, self.options.colors);
        w.blank();
        write_complete_function(&mut w);
        w.blank();
        w.open("export async function main(argv: string[] = process.argv.slice(2)): Promise<void>");
        w.open(&format!("if (argv[0] === {})", quote(GET_COMPLETIONS_FLAG)));
        w.line("console.log(complete(argv.slice(1)).join(\"\\n\"));");
        w.line("return;");
        w.close();
        write_completions_routing(&mut w);
        self.write_banner(&mut w);
        write_dispatch(&mut w, self.routes);
        match &self.handler_module {
            Some(module) => {
                w.line(format!("const {{ main: run }} = await import({});", quote(module)));
                w.line("return run(argv);");
            }
            None => {
                write_parse(&mut w, &ParserModel::from_args(self.request.args()));
                write_fallthrough(&mut w);
            }
        }
        w.close();
        w.blank();
        w.line("void main();");
        w.finish()
    }

    fn write_completion_table(&self, w: &mut SourceWriter) {
        w.open("const COMPLETIONS: Record<string, string[]> =");
        for (key, candidates) in self.completions {
            let quoted: Vec<String> = candidates.iter().map(|candidate| quote(candidate)).collect();
            w.line(format!("{}: [{}],", quote(key), quoted.join(", ")));
        }
        w.close_with(";");
    }

    fn write_banner(&self, w: &mut SourceWriter) {
        w.open(&format!("if (!argv.includes({}))", quote(&format!("--{NO_BANNER}"))));
        w.line(format!(
            "console.log(renderBanner({{ name: {}, title: {}, description: {}, version: VERSION }}));",
            quote(&self.options.name),
            quote(&self.options.title),
            quote(&self.options.description)
        ));
        w.close();
        w.blank();
    }
}

fn write_complete_function(w: &mut SourceWriter) {
    w.open("export function complete(words: string[]): string[]");
    w.line("const path: string[] = [];");
    w.open("for (const word of words.slice(0, -1))");
    w.line("const key = [...path, word.toLowerCase()].join(\" \");");
    w.open("if (key in COMPLETIONS)");
    w.line("path.push(word.toLowerCase());");
    w.close();
    w.close();
    w.line("const current = words.at(-1) ?? \"\";");
    w.line(
        "return (COMPLETIONS[path.join(\" \")] ?? []).filter((candidate) => candidate.startsWith(current));",
    );
    w.close();
}

fn write_completions_routing(w: &mut SourceWriter) {
    w.open(&format!("if (argv[0]?.toLowerCase() === {})", quote(COMPLETIONS_COMMAND)));
    w.open("switch (argv[1]?.toLowerCase())");
    for shell in Shell::all() {
        let module = format!("./{}", shell.handler_file().with_extension(""));
        w.open(&format!("case {}:", quote(&shell.to_string())));
        w.line(format!("const {{ handle }} = await import({});", quote(&module)));
        w.line("handle();");
        w.line("return;");
        w.close();
    }
    w.line("default:");
    w.line(format!(
        "  writeError(`Unsupported shell \"${{argv[1] ?? \"\"}}\", expected one of: {}`);",
        shell_candidates().join(", ")
    ));
    w.line("  process.exitCode = 1;");
    w.line("  return;");
    w.close();
    w.close();
    w.blank();
}

/// Completion lookup key of a command: its static path segments.
#[must_use]
pub fn completion_key(command: &Command) -> String {
    command
        .path
        .iter()
        .filter(|segment| dynamic_parameter(segment).is_none())
        .map(|segment| flag_name(segment))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Candidates offered after a command: sub-command names, then every
/// visible long flag spelling.
#[must_use]
pub fn completion_candidates(routes: &[DispatchRoute], request: &CommandRequest) -> Vec<String> {
    let mut candidates: Vec<String> = routes.iter().map(|route| route.name.clone()).collect();
    for arg in request.args().iter().filter(|arg| !arg.is_hidden()) {
        candidates.push(format!("--{}", arg.name));
        candidates.extend(
            arg.aliases()
                .iter()
                .filter(|alias| alias.chars().count() > 1)
                .map(|alias| format!("--{alias}")),
        );
    }
    candidates
}

/// Candidates of the root: top-level commands, the completions command,
/// and the root flags.
#[must_use]
pub fn root_candidates(routes: &[DispatchRoute], request: &CommandRequest) -> Vec<String> {
    let mut candidates = completion_candidates(routes, request);
    candidates.insert(routes.len(), COMPLETIONS_COMMAND.to_owned());
    candidates
}

/// Candidates after `completions`: the supported shells.
#[must_use]
pub fn shell_candidates() -> Vec<String> {
    Shell::all().map(|shell| shell.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storm_reflection::ReflectedType;

    use super::*;
    use crate::entry::CommandEntry;
    use crate::test_support::{FakeOracle, context_with, test_options};

    fn root_request(options: &CliOptions) -> CommandRequest {
        let context = context_with(Arc::new(FakeOracle::new()), options.clone());
        CommandRequest::from_reflection(
            &context,
            &CommandEntry::virtual_entry(Vec::new()),
            &ReflectedType::object(),
        )
        .expect("root request")
    }

    fn routes() -> Vec<DispatchRoute> {
        vec![DispatchRoute {
            name: "deploy".into(),
            module: "./deploy/index".into(),
            usage_module: "./deploy/usage".into(),
            description: "Ships the build.".into(),
        }]
    }

    fn render(handler_module: Option<String>) -> String {
        let options = test_options();
        let request = root_request(&options);
        let routes = routes();
        let mut completions = BTreeMap::new();
        completions.insert(String::new(), root_candidates(&routes, &request));
        completions.insert(COMPLETIONS_COMMAND.to_owned(), shell_candidates());
        RootModule {
            options: &options,
            request: &request,
            routes: &routes,
            handler_module,
            completions: &completions,
        }
        .render()
    }

    #[test]
    fn starts_with_a_shebang() {
        let module = render(None);

        assert!(module.starts_with("#!/usr/bin/env node\n// Generated by Storm Stack."));
        assert!(module.trim_end().ends_with("void main();"));
    }

    #[test]
    fn completions_route_before_the_banner() {
        let module = render(None);

        let get = module.find("if (argv[0] === \"--get-completions\")").expect("get");
        let routing = module
            .find("const { handle } = await import(\"./completions/bash/handle\");")
            .expect("routing");
        let banner = module.find("if (!argv.includes(\"--no-banner\"))").expect("banner");
        let dispatch = module.find("case \"deploy\": {").expect("dispatch");
        assert!(get < routing && routing < banner && banner < dispatch);
    }

    #[test]
    fn completion_table_lists_commands_and_flags() {
        let module = render(None);

        assert!(module.contains(
            "\"\": [\"deploy\", \"completions\", \"--help\", \"--version\", \"--no-banner\"],"
        ), "{module}");
        assert!(module.contains("\"completions\": [\"bash\", \"zsh\"],"));
    }

    #[test]
    fn root_handler_takes_over_after_dispatch() {
        let module = render(Some("./index".into()));

        assert!(module.contains("const { main: run } = await import(\"./index\");"));
        assert!(!module.contains("Unknown command"));
    }

    #[test]
    fn without_a_root_handler_usage_is_printed() {
        let module = render(None);

        assert!(module.contains("for (const block of [renderDeployUsage(\"minimal\")]) {"));
        assert!(module.contains("Unknown command"));
    }
}
