//! social-card - generate randomized social sharing cards from covers

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rand::thread_rng;

use backlist::compose;

const LOGO_PATH: &str = "avatar-300.png";

#[derive(Parser)]
#[command(name = "social-card")]
#[command(version, long_about = None)]
#[command(about = "Generate 1200x630 social cards from cover images")]
struct Cli {
    /// Number of card variants to generate
    #[arg(value_name = "COUNT")]
    count: usize,

    /// Cover images to shuffle into each card
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.count, &cli.images) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(count: usize, images: &[String]) -> backlist::Result<()> {
    let mut covers = compose::load_card_covers(images)?;
    // The logo is optional; cards render without it when the file is absent.
    let logo = Path::new(LOGO_PATH)
        .is_file()
        .then(|| image::open(LOGO_PATH).map(|img| img.to_rgba8()))
        .transpose()?;

    let mut rng = thread_rng();
    for index in 0..count {
        let card = compose::social_card(&mut covers, logo.as_ref(), &mut rng);
        let path = PathBuf::from(format!("output/social-card-{index}.jpg"));
        compose::save_jpeg(&card, &path, 90)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
