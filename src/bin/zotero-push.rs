//! zotero-push - create a Zotero collection from a book list

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use backlist::zotero::{self, ZoteroClient, ZoteroConfig};
use backlist::{bibtex, record};

#[derive(Parser)]
#[command(name = "zotero-push")]
#[command(version, long_about = None)]
#[command(about = "Push a list's bibliographic entries to the Backlist Zotero group")]
#[command(after_help = "Credentials are read from BACKLIST_ZOT_LIBRARY_ID and \
BACKLIST_ZOT_API_KEY.")]
struct Cli {
    /// Name for the new collection
    #[arg(value_name = "COLLECTION")]
    collection: String,

    /// List document with YAML frontmatter
    #[arg(value_name = "LIST")]
    list: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.collection, &cli.list) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(collection: &str, list: &str) -> backlist::Result<()> {
    let config = ZoteroConfig::from_env()?;
    let client = ZoteroClient::new(config);

    let located = record::resolve_list(Path::new(list))?;
    for ambiguity in &located.ambiguities {
        eprintln!(
            "warning: id {} matches {} record files",
            ambiguity.id,
            ambiguity.paths.len()
        );
    }

    let bibtex_text = record::collect_bibtex(&located.paths)?;
    let entries = bibtex::parse(&bibtex_text)?;
    let items: Vec<zotero::Item> = entries.iter().map(zotero::item_from_entry).collect();

    println!("Creating collection \"{collection}\" with {} items…", items.len());
    let summary = client.push_collection(collection, &items)?;
    println!(
        "Created collection {} with items: {}",
        summary.collection_key,
        summary.item_keys.join(", ")
    );
    Ok(())
}
