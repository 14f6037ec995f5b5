//! cover-convert - re-encode cover images at standard size and quality

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use image::imageops::FilterType;

use backlist::compose;

#[derive(Parser)]
#[command(name = "cover-convert")]
#[command(version, about = "Resize and re-encode covers as JPEG", long_about = None)]
struct Cli {
    /// Cover images to convert
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
    let covers = compose::load_covers(images, FilterType::CatmullRom)?;
    for (index, cover) in covers.iter().enumerate() {
        let path = PathBuf::from(format!("output/cover-{index}.jpg"));
        compose::save_jpeg(cover, &path, 70)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
