//! Entry module of a real command: dispatch, parsing, value resolution, and
//! the handler call.

use storm_reflection::quote;

use super::RUNTIME_MODULE;
use super::model::{DispatchRoute, FieldBinding, ParserModel, field_bindings};
use super::writer::SourceWriter;
use crate::command::Command;
use crate::naming::dynamic_parameter;
use crate::request::{CommandRequest, HELP, INTERACTIVE, NO_INTERACTIVE, VERSION};

/// Everything the entry module of one real command is rendered from.
#[derive(Debug)]
pub struct HandlerModule<'a> {
    /// Primary executable name, for environment variable prefixes.
    pub bin: &'a str,
    /// Application version printed by `--version`.
    pub version: &'a str,
    /// The command.
    pub command: &'a Command,
    /// Its flags.
    pub request: &'a CommandRequest,
    /// Sub-commands dispatched before parsing.
    pub routes: &'a [DispatchRoute],
    /// Import specifier of the handler module.
    pub source_import: String,
}

impl HandlerModule<'_> {
    /// Renders the module text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut w = SourceWriter::module();
        w.line(format!(
            "import {{ isInteractive, parseArgs, promptValue, toBoolean, toNumber, toNumberArray, toStringArray, writeError }} from {};",
            quote(RUNTIME_MODULE)
        ));
        w.line(self.handler_import());
        w.line("import { renderUsage } from \"./usage\";");
        w.blank();
        w.line(format!("const VERSION = {};", quote(self.version)));
        w.line(format!("const DEPTH = {};", self.command.depth()));
        w.blank();
        w.open(
            "export async function main(argv: string[] = process.argv.slice(2 + DEPTH)): Promise<void>",
        );
        write_dispatch(&mut w, self.routes);
        write_parse(&mut w, &ParserModel::from_args(self.request.args()));
        self.write_scaffold(&mut w);
        self.write_unknown_subcommand(&mut w);
        w.line("const data: Record<string, unknown> = {};");
        w.line("const missing: string[] = [];");
        for binding in field_bindings(self.request, self.bin) {
            write_binding(&mut w, &binding);
        }
        self.write_positionals(&mut w);
        w.open("if (missing.length > 0)");
        w.line("writeError(`Missing required options: ${missing.join(\", \")}`);");
        w.line("console.log(renderUsage(\"minimal\"));");
        w.line("process.exitCode = 1;");
        w.line("return;");
        w.close();
        w.blank();
        self.write_invocation(&mut w);
        w.close();
        w.finish()
    }

    fn handler_import(&self) -> String {
        let export = self
            .command
            .input
            .as_ref()
            .and_then(|input| input.export.as_deref());
        match export {
            Some(name) => format!(
                "import {{ {name} as handler }} from {};",
                quote(&self.source_import)
            ),
            None => format!("import handler from {};", quote(&self.source_import)),
        }
    }

    fn write_scaffold(&self, w: &mut SourceWriter) {
        w.open(&format!("if (args[{}] === true)", quote(HELP)));
        w.line("console.log(renderUsage(\"full\"));");
        w.line("return;");
        w.close();
        w.open(&format!("if (args[{}] === true)", quote(VERSION)));
        w.line("console.log(VERSION);");
        w.line("return;");
        w.close();
        w.blank();
        if self.request.find(INTERACTIVE).is_some() {
            w.line(format!(
                "const interactive = args[{}] !== true && args[{}] !== false && isInteractive();",
                quote(NO_INTERACTIVE),
                quote(INTERACTIVE)
            ));
        } else {
            w.line("const interactive = false;");
        }
    }

    /// Tokens left over after the dynamic segments name a sub-command that
    /// did not match any route.
    fn write_unknown_subcommand(&self, w: &mut SourceWriter) {
        if self.routes.is_empty()
            || self
                .command
                .dynamic_segments()
                .any(|segment| segment.starts_with("[..."))
        {
            return;
        }
        let consumed = self.command.dynamic_segments().count();
        w.open(&format!("if (args._.length > {consumed})"));
        w.line(format!(
            "writeError(`Unknown command \"${{String(args._[{consumed}])}}\"`);"
        ));
        w.line("console.log(renderUsage(\"full\"));");
        w.line("process.exitCode = 1;");
        w.line("return;");
        w.close();
        w.blank();
    }

    fn write_positionals(&self, w: &mut SourceWriter) {
        let segments: Vec<&str> = self.command.dynamic_segments().collect();
        if segments.is_empty() {
            return;
        }
        w.line("const positionals = args._;");
        for (index, segment) in segments.iter().enumerate() {
            let Some(param) = dynamic_parameter(segment) else {
                continue;
            };
            let key = quote(param);
            if segment.starts_with("[...") {
                w.open(&format!("if (positionals.length > {index})"));
                w.line(format!("data[{key}] = positionals.slice({index});"));
                w.close();
            } else {
                w.open(&format!("if (positionals[{index}] !== undefined)"));
                w.line(format!("data[{key}] = positionals[{index}];"));
                w.close();
                w.open("else");
                w.line(format!("missing.push({});", quote(&format!("<{param}>"))));
                w.close();
            }
        }
    }

    fn write_invocation(&self, w: &mut SourceWriter) {
        let payload = if self.request.wrapper().is_some() {
            "{ data }"
        } else {
            "data"
        };
        w.open("try");
        w.line(format!(
            "await handler({payload} as Parameters<typeof handler>[0]);"
        ));
        w.close();
        w.open("catch (error)");
        w.line("writeError(error);");
        w.line("process.exitCode = 1;");
        w.close();
    }
}

/// Case-insensitive sub-command dispatch on the first token.
pub fn write_dispatch(w: &mut SourceWriter, routes: &[DispatchRoute]) {
    if routes.is_empty() {
        return;
    }
    w.open("switch (argv[0]?.toLowerCase())");
    for route in routes {
        w.open(&format!("case {}:", quote(&route.name.to_lowercase())));
        w.line(format!(
            "const {{ main: run }} = await import({});",
            quote(&route.module)
        ));
        w.line("return run(argv.slice(1));");
        w.close();
    }
    w.line("default:");
    w.line("  break;");
    w.close();
    w.blank();
}

/// `const args = parseArgs(argv, { ... });` for `model`.
pub fn write_parse(w: &mut SourceWriter, model: &ParserModel) {
    let list = |names: &[String]| {
        let quoted: Vec<String> = names.iter().map(|flag| quote(flag)).collect();
        format!("[{}]", quoted.join(", "))
    };
    w.open("const args = parseArgs(argv,");
    w.line(format!("boolean: {},", list(&model.booleans)));
    w.line(format!("string: {},", list(&model.strings)));
    w.line(format!("array: {},", list(&model.arrays)));
    if model.aliases.is_empty() {
        w.line("alias: {},");
    } else {
        w.open("alias:");
        for (name, aliases) in &model.aliases {
            w.line(format!("{}: {},", quote(name), list(aliases)));
        }
        w.close_with(",");
    }
    w.close_with(");");
    w.blank();
}

fn write_binding(w: &mut SourceWriter, binding: &FieldBinding) {
    let flag = quote(&binding.flag);
    let key = quote(&binding.property);
    w.open("");
    match &binding.negation {
        Some(negation) => w.line(format!(
            "let value: unknown = args[{}] === true ? false : args[{flag}];",
            quote(negation)
        )),
        None => w.line(format!("let value: unknown = args[{flag}];")),
    }
    if let Some(env) = &binding.env {
        w.open("if (value === undefined)");
        w.line(format!("value = process.env[{}];", quote(env)));
        w.close();
    }
    if let Some(message) = &binding.prompt {
        let options: Vec<String> = binding.options.iter().map(|option| quote(option)).collect();
        let initial = binding.default.as_deref().unwrap_or("undefined");
        w.open("if (value === undefined && interactive)");
        w.line(format!(
            "value = await promptValue({{ name: {flag}, message: {}, kind: {}, options: [{}], initial: {initial} }});",
            quote(message),
            quote(binding.kind.prompt_kind()),
            options.join(", ")
        ));
        w.close();
    }
    if let Some(default) = &binding.default {
        w.open("if (value === undefined)");
        w.line(format!("value = {default};"));
        w.close();
    }
    w.open("if (value !== undefined)");
    match binding.kind.coercion() {
        Some(coerce) => w.line(format!("data[{key}] = {coerce}(value);")),
        None => w.line(format!("data[{key}] = String(value);")),
    }
    w.close();
    if binding.required {
        w.open("else");
        w.line(format!("missing.push({});", quote(&format!("--{}", binding.flag))));
        w.close();
    }
    w.close();
}
