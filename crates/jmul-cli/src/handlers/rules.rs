//! Rules command handler

use crate::cli::{OutputFormat, RulesArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use jmul_core::transformation::RuleSummary;
use jmul_core::xml;
use serde::Serialize;

/// Report shape for machine-readable output
#[derive(Debug, Serialize)]
struct RulesReport<'a> {
    strategy: &'a str,
    max_depth: usize,
    rules: Vec<RuleSummary>,
}

/// Handle the rules command
pub fn handle_rules(args: RulesArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let rules = registered_rules(args.path.as_ref())?;

    if output.format() != OutputFormat::Human {
        return output.data(&RulesReport {
            strategy: &config.transformation.strategy,
            max_depth: config.transformation.max_depth,
            rules,
        });
    }

    output.section("Transformation Rules")?;
    let rows = rules
        .into_iter()
        .map(|rule| vec![rule.path.to_string(), rule.priority.to_string(), rule.name])
        .collect();
    output.table(&["PATH", "PRIORITY", "RULE"], rows)?;
    output.success(&format!(
        "Strategy: {} (max depth {})",
        config.transformation.strategy, config.transformation.max_depth
    ))
}

/// Rules of both built-in containers, optionally restricted to one path
fn registered_rules(path: Option<&jmul_core::TransformationPath>) -> Result<Vec<RuleSummary>> {
    let encoding = xml::encode::container()?;
    let decoding = xml::decode::container()?;

    if let Some(path) = path {
        if !encoding.contains(path) && !decoding.contains(path) {
            return Err(jmul_core::Error::UnknownPath { path: path.clone() }.into());
        }
    }

    let mut rules = encoding.summaries();
    rules.extend(decoding.summaries());
    rules.retain(|rule| path.map_or(true, |path| &rule.path == path));
    Ok(rules)
}
