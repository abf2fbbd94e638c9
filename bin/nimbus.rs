use anyhow::{bail, Context, Result};
use clap::Parser;
use nimbus::{DialectId, Engine, EngineConfig};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "nimbus")]
#[command(about = "Run a JSON query against an in-memory corpus", long_about = None)]
struct Args {
    /// JSON file holding an array of documents (not needed with --explain)
    #[arg(long, env = "NIMBUS_CORPUS", required_unless_present = "explain")]
    corpus: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long, env = "NIMBUS_CONFIG")]
    config: Option<PathBuf>,

    /// Query dialect (overrides the config file)
    #[arg(long, env = "NIMBUS_DIALECT")]
    dialect: Option<DialectId>,

    /// Maximum number of hits (defaults to the configured size)
    #[arg(long)]
    size: Option<usize>,

    /// Document field holding the id (overrides the config file)
    #[arg(long)]
    id_field: Option<String>,

    /// Print the translated query tree instead of searching
    #[arg(long)]
    explain: bool,

    /// Query text, or `-` to read it from stdin
    query: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dialect) = args.dialect {
        config.dialect = dialect;
    }
    if let Some(id_field) = args.id_field {
        config.id_field = id_field;
    }
    let size = args.size.unwrap_or(config.default_size);

    let query = if args.query == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading query from stdin")?;
        text
    } else {
        args.query
    };

    let engine = Engine::with_config(config)?;

    if args.explain {
        let node = engine.parse(&query)?;
        println!("{}", serde_json::to_string_pretty(&node)?);
        return Ok(());
    }

    let Some(corpus_path) = args.corpus else {
        bail!("--corpus is required to search");
    };
    let text = std::fs::read_to_string(&corpus_path)
        .with_context(|| format!("reading corpus {}", corpus_path.display()))?;
    let corpus: Value = serde_json::from_str(&text).context("corpus is not valid JSON")?;
    let Value::Array(docs) = corpus else {
        bail!("corpus must be a JSON array of documents");
    };

    info!("Loading {} documents from {}", docs.len(), corpus_path.display());
    engine.index_corpus(docs)?;

    for hit in engine.query(&query, size)? {
        println!("{}", serde_json::to_string(&hit)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_needs_no_corpus() {
        let args = Args::try_parse_from(["nimbus", "--explain", "{}"]).unwrap();
        assert!(args.explain);
        assert_eq!(args.corpus, None);
    }

    #[test]
    fn test_search_requires_corpus() {
        let err = Args::try_parse_from(["nimbus", "{}"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let args = Args::try_parse_from(["nimbus", "--corpus", "docs.json", "{}"]).unwrap();
        assert_eq!(args.corpus, Some(PathBuf::from("docs.json")));
        assert_eq!(args.query, "{}");
    }
}
