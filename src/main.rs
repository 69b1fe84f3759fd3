/*!
 * Command-line interface for wixgen
 */

use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use wixgen::config::{Args, Config};
use wixgen::generator::Generator;
use wixgen::logging;
use wixgen::report::{ReportFormat, Reporter};
use wixgen::utils::count_files;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    logging::init(args.verbose);

    // Create and validate configuration
    let config = Config::from_args(args);
    config.validate()?;

    let progress = if config.report == ReportFormat::Table {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%)")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 Setup");
    progress.set_message(format!(
        "📂 Scanning directory: {}",
        config.build_dir.display()
    ));

    let generator = Generator::new(config.clone(), Arc::new(progress.clone()));

    // Count files for progress tracking
    let total_files = match count_files(&config.build_dir, &generator.walk_options()) {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count files: {}", e);
            0
        }
    };
    progress.set_length(total_files);
    progress.set_prefix("📊 Writing");

    let result = generator.run();
    progress.finish_and_clear();
    let report = result?;

    Reporter::new(config.report).print_report(&report)?;

    Ok(())
}
