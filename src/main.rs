//! backlist - collect purchase-link codes from a book list

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use backlist::record;

#[derive(Parser)]
#[command(name = "backlist")]
#[command(version, about = "Collect ASINs from a Backlist post", long_about = None)]
#[command(after_help = "EXAMPLES:
    backlist lists/2024/05/reading/index.md    Print the list's ASINs")]
struct Cli {
    /// List document with YAML frontmatter
    #[arg(value_name = "LIST")]
    list: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.list) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(list: &str) -> backlist::Result<()> {
    let located = record::resolve_list(Path::new(list))?;
    for ambiguity in &located.ambiguities {
        eprintln!(
            "warning: id {} matches {} record files",
            ambiguity.id,
            ambiguity.paths.len()
        );
    }

    let report = record::collect_asins(&located.paths)?;
    for path in &report.missing {
        eprintln!("warning: {} has no amzn field", path.display());
    }

    println!("ASINs for aStore:");
    println!("{}", report.asins.join(", "));
    Ok(())
}
