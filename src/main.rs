use clap::Parser;
use simple_site::{config, logging, output, pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Missing argument or unparseable command line.
const EXIT_USAGE: u8 = 1;
/// Configuration document missing, unreadable, or invalid.
const EXIT_CONFIG: u8 = 2;
/// Any failure inside the build pipeline.
const EXIT_BUILD: u8 = 3;

#[derive(Parser)]
#[command(name = "simple-site")]
#[command(about = "Build a static site from a theme tree, a source tree, and markdown pages")]
#[command(long_about = "\
Build a static site from a theme tree, a source tree, and markdown pages

Project structure:

  my-site/
  ├── simple-site.json          # Configuration (pages, style, quality, ...)
  ├── template/                 # Theme: page.html.jinja, gallery.html.jinja, css, js
  ├── src/                      # Site files, override theme files at the same path
  └── pages/
      └── index/                # Content of index.html
          ├── 1.md              # Articles, natural order (1, 2, 10)
          ├── 2.md
          └── trip.gallery.json # Imported with <import src=\"trip.gallery.json\">

The destination directory (dist/ by default) is deleted and rebuilt on
every run. Set SIMPLE_SITE_LOG=debug for per-file diagnostics.")]
#[command(version)]
struct Cli {
    /// Project root containing simple-site.json
    project: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let usage_error = e.use_stderr();
            let _ = e.print();
            return if usage_error {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = logging::init_logging() {
        eprintln!("warning: {e}");
    }

    let Some(project) = cli.project else {
        error!("Missing project root argument");
        eprintln!("Usage: simple-site <PROJECT>");
        return ExitCode::from(EXIT_USAGE);
    };

    let config = match config::load_config(&project) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration failed");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    init_thread_pool(&config.processing);

    info!(project = %project.display(), "Building");
    match pipeline::build(&config) {
        Ok(report) => {
            output::print_build_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Build failed");
            ExitCode::from(EXIT_BUILD)
        }
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
