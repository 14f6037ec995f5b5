//! tw-banner - composite cover images into a Twitter profile banner

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use image::imageops::FilterType;

use backlist::compose;

const OUTPUT_PATH: &str = "twitter-cover-image.jpg";

#[derive(Parser)]
#[command(name = "tw-banner")]
#[command(version, about = "Assemble cover images into a bordered banner", long_about = None)]
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
    let banner = compose::twitter_banner(&covers);
    compose::save_jpeg(&banner, Path::new(OUTPUT_PATH), 70)?;
    println!("Wrote {OUTPUT_PATH}");
    Ok(())
}
