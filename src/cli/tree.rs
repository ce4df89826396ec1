//! Clap command tree derived from the procedure registry.
//!
//! Every path segment becomes a nested subcommand and every schema field becomes an option, using the
//! short flags from the procedure metadata. Parsed flags are turned back into the JSON object the
//! procedure's input schema validates, so the CLI never bypasses validation.

use std::collections::BTreeMap;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::{Map, Number, Value};

use crate::registry::{ProcedureRegistry, RegisteredProcedure};
use crate::schema::{FieldKind, FieldSpec};

#[derive(Default)]
struct Node<'a> {
    children: BTreeMap<&'a str, Node<'a>>,
    procedure: Option<&'a dyn RegisteredProcedure>,
}

impl<'a> Node<'a> {
    fn insert(&mut self, segments: &'a [String], procedure: &'a dyn RegisteredProcedure) {
        match segments.split_first() {
            None => self.procedure = Some(procedure),
            Some((head, rest)) => self.children.entry(head.as_str()).or_default().insert(rest, procedure),
        }
    }

    fn into_command(self, mut command: Command) -> Command {
        if let Some(procedure) = self.procedure {
            command = command.about(procedure.meta().description.clone());
            for arg in field_args(procedure) {
                command = command.arg(arg);
            }
        } else {
            command = command.subcommand_required(true).arg_required_else_help(true);
        }

        for (name, child) in self.children {
            command = command.subcommand(child.into_command(Command::new(name.to_string())));
        }
        command
    }
}

fn parse_number(raw: &str) -> Result<Number, String> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Number::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| format!("'{raw}' is not a number"))
}

fn field_args(procedure: &dyn RegisteredProcedure) -> Vec<Arg> {
    let meta = procedure.meta();
    procedure
        .fields()
        .iter()
        .map(|field| {
            let mut arg = Arg::new(field.name).help(field.help);
            if let Some(index) = meta.args.iter().position(|a| a == field.name) {
                arg = arg.index(index + 1);
            } else {
                arg = arg.long(field.name);
                if let Some(short) = meta.short_for(field.name) {
                    arg = arg.short(short);
                }
            }
            match field.kind {
                FieldKind::Bool => arg.action(ArgAction::SetTrue),
                FieldKind::String => arg.action(ArgAction::Set),
                FieldKind::Number => arg
                    .action(ArgAction::Set)
                    .allow_negative_numbers(true)
                    .value_parser(parse_number),
            }
        })
        .collect()
}

/// Build the `call` command tree for every registered procedure.
pub fn procedure_command(registry: &ProcedureRegistry) -> Command {
    let mut root = Node::default();
    for procedure in registry.iter() {
        root.insert(procedure.path().segments(), procedure);
    }
    root.into_command(Command::new("testproc call").no_binary_name(true))
}

/// Follow the matched subcommands down to a procedure.
///
/// Returns the path segments and the matches holding the procedure's own flags.
pub fn resolve_path(matches: &ArgMatches) -> (Vec<String>, &ArgMatches) {
    let mut segments = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        segments.push(name.to_string());
        current = sub;
    }
    (segments, current)
}

/// Collect the flags the user actually passed into a JSON object.
///
/// Unset switches are left out so the schema's defaults apply.
pub fn flags_to_input(fields: &[FieldSpec], matches: &ArgMatches) -> Map<String, Value> {
    let mut input = Map::new();
    for field in fields {
        let value = match field.kind {
            FieldKind::Bool => matches.get_flag(field.name).then_some(Value::Bool(true)),
            FieldKind::String => matches.get_one::<String>(field.name).cloned().map(Value::String),
            FieldKind::Number => matches.get_one::<Number>(field.name).cloned().map(Value::Number),
        };
        if let Some(value) = value {
            input.insert(field.name.to_string(), value);
        }
    }
    input
}
