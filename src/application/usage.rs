//! Usage text for help paths.
//!
//! Rendering is cosmetic: commands and parameters are listed sorted by name,
//! parameters before the grammar footer.

use itertools::Itertools;
use tabled::{builder::Builder, settings::Style};

use crate::application::router::CommandLine;
use crate::domain::{Invocable, ParameterInfo};

/// Usage of a single command.
pub fn command_usage(program: &str, command: &dyn Invocable) -> String {
    let mut out = header(program, Some(command.name()));
    out.push('\n');
    if !command.description().is_empty() {
        out.push_str(command.description());
        out.push_str("\n\n");
    }
    out.push_str(&parameters(command, None));
    out.push('\n');
    out.push_str(&footer());
    out
}

/// Usage of the whole command line: every command and every parameter.
pub fn program_usage(cli: &CommandLine) -> String {
    let program = cli.program_name();
    let mut out = String::new();

    match cli.implicit() {
        Some(command) => {
            out.push_str(&header(program, None));
            out.push('\n');
            if !cli.description().is_empty() {
                out.push_str(cli.description());
                out.push_str("\n\n");
            }
            out.push_str(&parameters(command, None));
            out.push('\n');
        }
        None => {
            out.push_str(&header(program, Some("<command>")));
            out.push('\n');
            if !cli.description().is_empty() {
                out.push_str(cli.description());
                out.push_str("\n\n");
            }
            let commands = cli.commands();
            out.push_str("Commands:\n");
            out.push_str(&table(
                commands
                    .iter()
                    .map(|c| vec![format!("  {}", c.name()), c.description().to_string()]),
            ));
            out.push('\n');
            for command in commands {
                out.push_str(&parameters(command, Some(command.name())));
                out.push('\n');
            }
        }
    }

    out.push_str(&footer());
    out
}

fn header(program: &str, tag: Option<&str>) -> String {
    let tag = tag.map(|t| format!("{t} ")).unwrap_or_default();
    format!("Usage: {program} {tag}-h|--help\nUsage: {program} {tag}<parameters>\n")
}

fn default_column(p: &dyn ParameterInfo) -> String {
    match (p.is_optional(), p.default_label()) {
        (false, _) => String::new(),
        (true, Some(label)) => format!("?:{label}"),
        (true, None) => "?".to_string(),
    }
}

fn parameters(command: &dyn Invocable, title: Option<&str>) -> String {
    let mut out = match title {
        Some(name) => format!("{name} parameters:\n"),
        None => "Parameters:\n".to_string(),
    };
    let rows = command
        .parameters()
        .into_iter()
        .sorted_by(|a, b| a.name().cmp(b.name()))
        .map(|p| {
            vec![
                format!("  {}", parameter_key(p)),
                format!("<{}>", p.type_name()),
                default_column(p),
                p.description().to_string(),
            ]
        })
        .collect::<Vec<_>>();
    if rows.is_empty() {
        out.push_str("  (none)\n");
    } else {
        out.push_str(&table(rows));
    }
    out
}

/// `-a|-b|--name`
fn parameter_key(parameter: &dyn ParameterInfo) -> String {
    parameter
        .aliases()
        .iter()
        .map(|alias| format!("-{alias}"))
        .chain(std::iter::once(format!("--{}", parameter.name())))
        .join("|")
}

fn footer() -> String {
    table([
        vec![
            "<parameters>".to_string(),
            ":=".to_string(),
            "<p1-key> <p1-value> ... <pN-key> <pN-value>".to_string(),
        ],
        vec![
            "<p-key>".to_string(),
            ":=".to_string(),
            "-<p-alias>|--<p-name>".to_string(),
        ],
    ])
}

fn table<I>(rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    for row in rows {
        builder.push_record(row);
    }
    let rendered = builder.build().with(Style::empty()).to_string();
    rendered
        .lines()
        .map(str::trim_end)
        .join("\n")
        + "\n"
}
