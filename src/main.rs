use std::sync::Arc;

use clap::Parser;
use helpdesk::{
    DataDir,
    DirectorySource,
    Retriever,
    citation::{Citation, citations, preview},
    cli::{self, Cli, Command},
    error,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Characters of each passage shown in human-readable search output.
const HUMAN_PREVIEW_CHARS: usize = 80;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("HELPDESK_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    init_tracing(cli.verbose, cli.quiet);

    let data_dir = DataDir::resolve(cli.kb_dir.as_deref())?;
    let retriever =
        Arc::new(Retriever::open(Arc::new(DirectorySource::new(data_dir.root()))));

    match cli.command {
        Command::Search(args) => cmd_search(&retriever, &args)?,
        Command::List(args) => cmd_list(&retriever, &args)?,
        Command::Get(args) => cmd_get(&retriever, &args)?,
        Command::Status(args) => cmd_status(&retriever, &data_dir, args.json),
        Command::Mcp => helpdesk::mcp::run_mcp(retriever)?,
        Command::Completions(_) => {}
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput<'a> {
    query: &'a str,
    result_count: usize,
    results: Vec<SearchOutputItem<'a>>,
    citations: Vec<Citation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutputItem<'a> {
    rank: usize,
    score: f64,
    filename: &'a str,
    passage_index: usize,
    passage: &'a str,
    fallback: bool,
}

fn cmd_search(retriever: &Retriever, args: &cli::SearchArgs) -> error::Result<()> {
    let results = retriever.search(&args.query, args.count);

    if args.json {
        let output = SearchOutput {
            query: &args.query,
            result_count: results.len(),
            results: results
                .iter()
                .enumerate()
                .map(|(i, r)| SearchOutputItem {
                    rank: i + 1,
                    score: r.score,
                    filename: &r.document.filename,
                    passage_index: r.passage_index,
                    passage: &r.passage,
                    fallback: r.is_fallback(),
                })
                .collect(),
            citations: citations(&results),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    for (i, r) in results.iter().enumerate() {
        let marker = if r.is_fallback() { " (fallback)" } else { "" };
        println!(
            "{:>3}. [{:.3}] {}#{}{marker}",
            i + 1,
            r.score,
            r.document.filename,
            r.passage_index
        );
        let flat = r.passage.replace('\n', " ");
        println!("     {}", preview(&flat, HUMAN_PREVIEW_CHARS));
    }
    println!("\n{} result(s)", results.len());
    Ok(())
}

fn cmd_list(retriever: &Retriever, args: &cli::ListArgs) -> error::Result<()> {
    let matcher = args
        .pattern
        .as_deref()
        .map(|pattern| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher())
                .map_err(|e| {
                    error::Error::Config(format!("invalid glob pattern: {e}"))
                })
        })
        .transpose()?;

    let documents: Vec<_> = retriever
        .documents()
        .into_iter()
        .filter(|d| matcher.as_ref().is_none_or(|m| m.is_match(&d.filename)))
        .collect();

    if args.json {
        let items: Vec<_> = documents
            .iter()
            .map(|d| {
                json!({
                    "id": d.id,
                    "filename": d.filename,
                    "passages": d.passages.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string(&items)?);
    } else if documents.is_empty() {
        println!("No documents indexed.");
    } else {
        for d in &documents {
            println!("{}\t{} passage(s)", d.filename, d.passages.len());
        }
    }
    Ok(())
}

fn cmd_get(retriever: &Retriever, args: &cli::GetArgs) -> error::Result<()> {
    let document = retriever.document(&args.filename).ok_or_else(|| {
        error::Error::NotFound {
            kind: "document",
            name: args.filename.clone(),
        }
    })?;

    if args.json {
        println!("{}", serde_json::to_string(document.as_ref())?);
        return Ok(());
    }

    println!("--- {} ---", document.filename);
    for (i, passage) in document.passages.iter().enumerate() {
        println!("[{i}] {passage}");
    }
    Ok(())
}

fn cmd_status(retriever: &Retriever, data_dir: &DataDir, json: bool) {
    let ready = retriever.is_ready();
    let documents = retriever.document_count();
    let passages = retriever.passage_count();

    if json {
        println!(
            "{}",
            json!({
                "kbDir": data_dir.root().display().to_string(),
                "ready": ready,
                "documents": documents,
                "passages": passages,
            })
        );
    } else {
        println!("Knowledge base: {}", data_dir.root().display());
        println!("Ready: {ready}");
        println!("Documents: {documents}");
        println!("Passages: {passages}");
    }
}
