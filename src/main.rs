use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use profile_scraper::common::constants::get_supported_formats;
use profile_scraper::export::{self, ExportFormat};
use profile_scraper::renderer::{FileRenderer, HttpRenderer, Renderer, StdinRenderer};
use profile_scraper::{extract_page, logging, metrics, DataType, ExtractorConfig, ProfileExtractor};

#[derive(Parser)]
#[command(name = "profile_scraper")]
#[command(about = "Heuristic profile extraction from arbitrary HTML pages")]
#[command(version)]
struct Cli {
    /// Also write JSON logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract profiles (and optionally emails, images, tables) from a page
    Extract {
        /// Read the page from a saved HTML file
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
        /// Fetch the page over HTTP
        #[arg(long)]
        url: Option<String>,
        /// TOML file overriding vocabularies, synonyms, patterns or thresholds
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format: json, csv or tsv
        #[arg(long, default_value = "json")]
        format: String,
        /// Output file; `-` writes to stdout. Defaults to a timestamped file in --output-dir
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Comma-separated data types: profiles, emails, images, tables
        #[arg(long, default_value = "profiles")]
        data_types: String,
        /// Print a Prometheus metrics snapshot to stderr after the run
        #[arg(long)]
        metrics: bool,
    },
    /// Print the effective configuration as TOML
    Vocab {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ExtractorConfig> {
    match path {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ExtractorConfig::default()),
    }
}

fn select_renderer(file: Option<PathBuf>, url: Option<String>) -> anyhow::Result<Box<dyn Renderer>> {
    Ok(match (file, url) {
        (Some(path), _) => Box::new(FileRenderer::new(path)),
        (None, Some(url)) => Box::new(HttpRenderer::new(url)?),
        (None, None) => Box::new(StdinRenderer),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_dir.as_deref());

    match cli.command {
        Commands::Extract {
            file,
            url,
            config,
            format,
            output,
            output_dir,
            data_types,
            metrics: show_metrics,
        } => {
            if show_metrics {
                metrics::init_metrics();
            }

            let format: ExportFormat = format.parse().with_context(|| {
                format!("supported formats: {}", get_supported_formats().join(", "))
            })?;
            let data_types = DataType::parse_list(&data_types)?;
            let extractor = ProfileExtractor::new(load_config(config.as_deref())?)?;

            let renderer = select_renderer(file, url)?;
            info!(source = renderer.name(), "rendering page");
            let html = renderer.render().await?;

            let page = extract_page(&extractor, &html, &data_types);

            if let Some(report) = &page.report {
                eprintln!("Profiles: {}", report.profiles.len());
                for stats in &report.tiers {
                    eprintln!(
                        "   {:<18} located {:>4}  accepted {:>4}  emitted {:>4}",
                        stats.tier.as_str(),
                        stats.located,
                        stats.accepted,
                        stats.emitted
                    );
                }
                if report.duplicates_dropped > 0 {
                    eprintln!("   Duplicates dropped: {}", report.duplicates_dropped);
                }
                if report.fallback_used {
                    warn!("results came from the unfiltered fallback pass");
                }
                if report.no_profiles_found {
                    eprintln!("No profiles found");
                }
            }

            match output.as_deref() {
                Some(path) if path == Path::new("-") => {
                    print!("{}", export::render_page(&page, format)?);
                }
                path => {
                    let written = export::export_to_path(&page, format, path, &output_dir)?;
                    eprintln!("Output file: {}", written.display());
                }
            }

            if show_metrics {
                if let Some(snapshot) = metrics::render() {
                    eprintln!("{}", snapshot);
                }
            }
        }
        Commands::Vocab { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
