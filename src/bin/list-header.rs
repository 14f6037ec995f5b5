//! list-header - composite cover images into a list header strip

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use image::imageops::FilterType;

use backlist::compose;

const OUTPUT_PATH: &str = "output/list-header.jpg";

#[derive(Parser)]
#[command(name = "list-header")]
#[command(version, about = "Assemble cover images into a header strip", long_about = None)]
struct Cli {
    /// Cover images, left to right
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.images) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(images: &[String]) -> backlist::Result<()> {
    let covers = compose::load_covers(images, FilterType::Lanczos3)?;
    let strip = compose::header_strip(&covers);
    compose::save_jpeg(&strip, Path::new(OUTPUT_PATH), 50)?;
    println!("Wrote {OUTPUT_PATH}");
    Ok(())
}
