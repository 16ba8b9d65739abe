use std::env;

use lexrag_cli::args::IndexArgs;
use lexrag_cli::{bootstrap, logging};
use lexrag_core::config::Config;

fn usage() {
    eprintln!("Usage: lexrag-index [--from-dir DIR]");
    eprintln!(
        "Embeds every catalog entry and writes the LanceDB table; \
         --from-dir rebuilds the catalog from DIR/**/*.txt first."
    );
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args: Vec<String> = env::args().skip(1).collect();
    let parsed = match IndexArgs::parse(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            usage();
            std::process::exit(2);
        }
    };
    if parsed.help {
        usage();
        return Ok(());
    }
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;

    println!("LanceDB Indexer\n===============");
    if let Some(dir) = &parsed.from_dir {
        println!("Source directory: {}", dir.display());
    }
    println!("Catalog: {}", settings.paths.catalog.display());
    println!(
        "Index: {} (table '{}')",
        settings.paths.index_dir.display(),
        settings.paths.table
    );

    let written = bootstrap::index_corpus(&settings, parsed.from_dir.as_deref())?;
    println!("\nIndexed {written} entries.");
    println!("To ask a question, use: cargo run --bin lexrag-ask '<question>'");
    Ok(())
}
