//! Reading models from scripts.
//!
//! A script has one statement per line. Everything after a `%` is a comment, and blank lines are
//! ignored.
//!
//! ```text
//! domain <name> = <range>
//! var <name> : <domain>
//! array <name>[<size>] : <domain>
//! override <name>[<index>] : <range>
//! constraint <name> : <constraint or expander>
//! ```

use std::io;
use std::io::BufRead;
use std::str::FromStr;

use workbench_core::Band;
use workbench_core::Constraint;
use workbench_core::Domain;
use workbench_core::Model;
use workbench_core::SharedDomain;
use workbench_core::Variable;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ScriptError {
    #[error("failed to read from source: {0}")]
    IoError(#[from] io::Error),

    #[error("failed to parse line {line_nr}: {reason}")]
    ParseError { line_nr: usize, reason: String },
}

/// Read the model called `name` from a script.
pub(crate) fn read_model(name: &str, source: impl BufRead) -> Result<Model, ScriptError> {
    let mut model = Model::new(name);

    for (idx, line) in source.lines().enumerate() {
        let line = line?;

        parse_statement(&mut model, &line).map_err(|reason| ScriptError::ParseError {
            line_nr: idx + 1,
            reason,
        })?;
    }

    Ok(model)
}

fn parse_statement(model: &mut Model, line: &str) -> Result<(), String> {
    let statement = match line.split_once('%') {
        Some((statement, _comment)) => statement,
        None => line,
    }
    .trim();

    if statement.is_empty() {
        return Ok(());
    }

    let (keyword, rest) = statement
        .split_once(char::is_whitespace)
        .unwrap_or((statement, ""));

    match keyword {
        "domain" => {
            let (name, range) = split(rest, '=')?;
            let band = parse::<Band>(range)?;
            let domain = SharedDomain::new(name, band).map_err(|e| e.to_string())?;
            model.add_shared_domain(domain);
        }

        "var" => {
            let (name, domain) = split(rest, ':')?;
            let variable = Variable::singleton(name, parse_domain(domain)?)
                .map_err(|e| e.to_string())?;
            model.add_variable(variable);
        }

        "array" => {
            let (head, domain) = split(rest, ':')?;
            let (name, size) = parse_indexed(head)?;
            let variable = Variable::aggregate(name, size, parse_domain(domain)?)
                .map_err(|e| e.to_string())?;
            model.add_variable(variable);
        }

        "override" => {
            let (head, range) = split(rest, ':')?;
            let (name, index) = parse_indexed(head)?;
            let band = parse::<Band>(range)?;
            model
                .override_element_domain(name, index, band)
                .map_err(|e| e.to_string())?;
        }

        "constraint" => {
            let (name, expression) = split(rest, ':')?;
            let constraint = Constraint::parse(name, expression).map_err(|e| e.to_string())?;
            model.add_constraint(constraint);
        }

        other => return Err(format!("unknown statement '{other}'")),
    }

    Ok(())
}

fn split(text: &str, separator: char) -> Result<(&str, &str), String> {
    text.split_once(separator)
        .map(|(lhs, rhs)| (lhs.trim(), rhs.trim()))
        .ok_or_else(|| format!("expected '{separator}' in '{text}'"))
}

fn parse<T: FromStr>(text: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    text.parse::<T>().map_err(|e| format!("invalid '{text}': {e}"))
}

fn parse_domain(text: &str) -> Result<Option<Domain>, String> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse::<Domain>(text).map(Some)
    }
}

/// Parse `<name>[<number>]`.
fn parse_indexed(text: &str) -> Result<(&str, usize), String> {
    let (name, index) = text
        .strip_suffix(']')
        .and_then(|text| text.split_once('['))
        .ok_or_else(|| format!("expected '<name>[<number>]', got '{text}'"))?;

    Ok((name.trim(), parse::<usize>(index.trim())?))
}
