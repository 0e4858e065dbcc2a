//! Encode command handler

use super::utils::{configure, emit, ensure_exists};
use crate::cli::EncodeArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jmul_core::{xml, ObjectGraph, XmlDocument};
use tracing::{info, instrument};

/// Handle the encode command
#[instrument(skip(config, output), fields(file = %args.input.display()))]
pub fn handle_encode(args: EncodeArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("encode", &args.input.display().to_string());
    ensure_exists(&args.input)?;

    let spinner = output.spinner("Encoding object graph...");
    let encoded = encode_file(&args, config);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let (document, objects) = encoded?;

    let pretty = config.output.pretty && !args.compact;
    let text = document.to_xml_string(pretty)?;
    emit(&text, args.save_to.as_deref(), output)?;

    info!(objects, nodes = document.len(), "Encoded object graph");
    if let Some(path) = &args.save_to {
        output.success(&format!("✓ Encoded {} objects to {}", objects, path.display()))?;
    }

    Ok(())
}

/// Read the JSON input and run it through the configured encoder
fn encode_file(args: &EncodeArgs, config: &Config) -> Result<(XmlDocument, usize)> {
    let json = jmul_core::io::read_json(&args.input).map_err(|e| match e {
        jmul_core::Error::Json(_) => Error::InvalidFormat {
            path: args.input.clone(),
            expected: "JSON".to_string(),
        },
        other => other.into(),
    })?;

    let (graph, root) = ObjectGraph::from_json(&json)?;
    let engine = configure(xml::encoder()?, config, args.strategy)?;
    let declared = args
        .declared_type
        .clone()
        .unwrap_or_else(|| graph.runtime_type(&root));

    let document = xml::encode_declared(&engine, &graph, &root, declared)?;
    Ok((document, graph.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use jmul_core::DeclaredType;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(input: PathBuf, save_to: Option<PathBuf>) -> EncodeArgs {
        EncodeArgs {
            input,
            save_to,
            compact: true,
            declared_type: None,
            strategy: None,
        }
    }

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(std::io::sink()))
    }

    #[test]
    fn test_encode_shared_json_reference() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("graph.json");
        let output = dir.path().join("graph.xml");
        std::fs::write(
            &input,
            r#"{"first": {"$id": 7, "name": "shared"}, "second": {"$ref": 7}}"#,
        )
        .unwrap();

        handle_encode(args(input, Some(output.clone())), &Config::default(), &mut quiet_output()).unwrap();

        let xml = std::fs::read_to_string(&output).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<object-graph declared-type=\"map\">"));
        assert!(xml.contains("<reference ref="));
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = handle_encode(
            args(dir.path().join("absent.json"), None),
            &Config::default(),
            &mut quiet_output(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_json_is_reported_as_format_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.json");
        std::fs::write(&input, "{ not json").unwrap();

        let err = handle_encode(args(input, None), &Config::default(), &mut quiet_output()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }), "{err}");
    }

    #[test]
    fn test_declared_type_must_accept_root() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("list.json");
        std::fs::write(&input, "[1, 2]").unwrap();

        let mut encode = args(input, None);
        encode.declared_type = Some(DeclaredType::Map);
        let err = handle_encode(encode, &Config::default(), &mut quiet_output()).unwrap_err();
        assert!(matches!(err, Error::Core(jmul_core::Error::Malformed { .. })), "{err}");
    }
}
