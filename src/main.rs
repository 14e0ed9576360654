use pagewright::{DeliverySlip, PagewrightError, RenderConfig};
use std::env;
use std::fs::File;
use std::io::BufWriter;

/// Renders the sample delivery slip.
///
/// Usage: `pagewright [config.json] [output.pdf]`
fn main() -> Result<(), PagewrightError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 3 {
        eprintln!("Usage: {} [path/to/config.json] [path/to/output.pdf]", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(1) {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let output_path = args.get(2).map_or("output.pdf", String::as_str);

    let slip = DeliverySlip::sample(config.groups, config.rows_per_group);
    log::info!("Rendering {} sales groups to {}", slip.groups.len(), output_path);
    let writer = BufWriter::new(File::create(output_path)?);
    slip.render(&config, writer)?;

    println!("Successfully generated {}", output_path);
    Ok(())
}
