use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use diagram_engine::config::{ConfigError, EditorConfig};
use diagram_engine::document::DocumentError;
use diagram_engine::engine::EditorSession;

#[derive(Debug, thiserror::Error)]
enum NormalizeError {
    #[error("i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),
}

/// Load a diagram document, repair it, and write it back out.
#[derive(Parser, Debug)]
#[command(name = "diagram-normalize", about = "Validate and normalise a diagram JSON document")]
struct Cli {
    /// Input document; reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Write here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), NormalizeError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EditorConfig::from_env()?;

    let json = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut session = EditorSession::new(config);
    session.import_json(&json)?;
    let out = session.export_json()?;
    tracing::info!(shapes = session.store().len(), "document normalised");

    match cli.output {
        Some(path) => fs::write(path, out)?,
        None => println!("{out}"),
    }
    Ok(())
}
