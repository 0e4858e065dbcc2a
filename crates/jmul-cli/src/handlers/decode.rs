//! Decode command handler

use super::utils::{configure, emit, ensure_exists};
use crate::cli::DecodeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jmul_core::xml;
use tracing::{info, instrument};

/// Handle the decode command
#[instrument(skip(config, output), fields(file = %args.input.display()))]
pub fn handle_decode(args: DecodeArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("decode", &args.input.display().to_string());
    ensure_exists(&args.input)?;

    let spinner = output.spinner("Decoding object graph...");
    let decoded = decode_file(&args, config);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let json = decoded?;

    let text = if args.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    emit(&text, args.save_to.as_deref(), output)?;

    if let Some(path) = &args.save_to {
        output.success(&format!("✓ Decoded {} to {}", args.input.display(), path.display()))?;
    }

    Ok(())
}

/// Parse the XML input and run it through the configured decoder
fn decode_file(args: &DecodeArgs, config: &Config) -> Result<serde_json::Value> {
    let document = jmul_core::io::read_document(&args.input)?;
    let engine = configure(xml::decoder()?, config, args.strategy)?;
    let (graph, root) = xml::decode(&engine, &document)?;

    info!(objects = graph.len(), nodes = document.len(), "Decoded object graph");
    Ok(graph.to_json(&root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{EncodeArgs, OutputFormat};
    use crate::error::Error;
    use crate::handlers::handle_encode;
    use serde_json::json;
    use tempfile::TempDir;

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(std::io::sink()))
    }

    #[test]
    fn test_encode_then_decode_restores_json() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("order.json");
        let encoded = dir.path().join("order.xml");
        let decoded = dir.path().join("order.out.json");
        let order = json!({
            "id": "A-17",
            "lines": [{"sku": "pen", "qty": 2}, {"sku": "ink", "qty": 1}],
            "paid": false
        });
        std::fs::write(&input, order.to_string()).unwrap();

        handle_encode(
            EncodeArgs {
                input,
                save_to: Some(encoded.clone()),
                compact: false,
                declared_type: None,
                strategy: None,
            },
            &Config::default(),
            &mut quiet_output(),
        )
        .unwrap();

        handle_decode(
            DecodeArgs {
                input: encoded,
                save_to: Some(decoded.clone()),
                pretty: true,
                strategy: None,
            },
            &Config::default(),
            &mut quiet_output(),
        )
        .unwrap();

        let text = std::fs::read_to_string(&decoded).unwrap();
        let restored: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, order);
    }

    #[test]
    fn test_unknown_element_has_no_rule() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("odd.xml");
        std::fs::write(
            &input,
            r#"<?xml version="1.0"?><object-graph declared-type="any"><tuple/></object-graph>"#,
        )
        .unwrap();

        let err = handle_decode(
            DecodeArgs {
                input,
                save_to: None,
                pretty: false,
                strategy: None,
            },
            &Config::default(),
            &mut quiet_output(),
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::Core(jmul_core::Error::NoApplicableRule { .. })),
            "{err}"
        );
    }
}
