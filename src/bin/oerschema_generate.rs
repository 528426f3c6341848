use anyhow::{Context, Result};
use clap::Parser;
use oerschema::convert::ConvertOptions;
use oerschema::uri::DEFAULT_BASE_URL;
use oerschema::{GenerateOptions, LoggingConfig, Vocabulary, generate_site, init_logging};
use std::path::PathBuf;

/// Pre-renders the vocabulary into static files.
#[derive(Debug, Parser)]
#[command(name = "oerschema-generate", version)]
struct Args {
    /// Output directory; files land in `<out>/schema/`
    #[arg(long, short, default_value = "public")]
    out: PathBuf,

    /// Vocabulary file (YAML or JSON); the bundled vocabulary when omitted
    #[arg(long, env = "OERSCHEMA_VOCABULARY")]
    vocabulary: Option<PathBuf>,

    #[arg(long, env = "OERSCHEMA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Indent JSON output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pretty: bool,

    /// Parse Turtle, N-Triples and RDF/XML output back and fail on errors
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    let _guard = init_logging(LoggingConfig::from_env())?;
    let args = Args::parse();

    if !oerschema::uri::is_absolute(&args.base_url) || !args.base_url.ends_with('/') {
        anyhow::bail!(
            "base URL must be an absolute http(s) URL ending in '/': {}",
            args.base_url
        );
    }

    let vocabulary = match &args.vocabulary {
        Some(path) => Vocabulary::load(path)
            .with_context(|| format!("failed to load vocabulary from {}", path.display()))?,
        None => Vocabulary::embedded().context("failed to parse the bundled vocabulary")?,
    };

    let options = GenerateOptions {
        out_dir: args.out,
        convert: ConvertOptions::new(args.base_url).pretty(args.pretty),
        verify: args.verify,
    };
    let report = generate_site(&vocabulary, &options)?;

    println!(
        "wrote {} files ({} classes, {} properties) to {}",
        report.files_written,
        report.classes,
        report.properties,
        options.out_dir.join("schema").display()
    );
    if options.verify {
        println!("verified {} RDF documents, {} triples", report.verified, report.triples);
    }
    Ok(())
}
