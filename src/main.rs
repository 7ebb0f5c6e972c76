use clap::{Parser, Subcommand};
use shortlist::config::{self, BuildSettings};
use shortlist::images::HttpFetcher;
use shortlist::{logging, output, pipeline};
use std::convert::Infallible;
use std::path::PathBuf;

/// Flags for the `build` command.
#[derive(clap::Args, Clone)]
struct BuildArgs {
    /// Affiliate tag added to every product link
    #[arg(long, env = "AMZ_PARTNER_TAG", default_value = "", hide_env_values = true)]
    partner_tag: String,

    /// Download product images and serve local copies (1/true/yes to enable)
    #[arg(
        long,
        env = "CACHE_IMAGES",
        action = clap::ArgAction::Set,
        default_value = "0",
        default_missing_value = "1",
        num_args = 0..=1,
        value_parser = parse_flag
    )]
    cache_images: bool,

    /// Parallel image downloads
    #[arg(long, default_value_t = 4)]
    jobs: usize,

    /// Directory of static files copied into the output root
    #[arg(long)]
    assets: Option<PathBuf>,
}

fn parse_flag(value: &str) -> Result<bool, Infallible> {
    Ok(config::parse_flag(value))
}

#[derive(Parser)]
#[command(name = "shortlist")]
#[command(about = "Static site generator for affiliate product shortlists")]
#[command(long_about = "\
Static site generator for affiliate product shortlists

One JSON file is the data source. Products are rendered as cards in the
order they appear, every outbound link carries your affiliate tag, and the
output is a plain static site ready for GitHub Pages.

Config structure (site_config.json):

  {
    \"title\": \"Best Widgets\",                  # Required
    \"description\": \"...\",                     # <meta name=description>
    \"intro_paragraphs\": [\"...\"],              # Shown under the title
    \"meta_note\": \"...\",                       # Muted note under the intro
    \"products\": [                             # Required, display order
      {
        \"amazon_asin\": \"B0...\",               # Dedup key, derives the link
        \"product_name\": \"Widget A\",           # alias: name
        \"description\": \"...\",
        \"image_url\": \"https://...\",           # alias: image
        \"amazon_url\": \"https://...\",          # alias: link
        \"best_for\": [\"Travel\", \"Kids\"]        # Up to two tags
      }
    ],
    \"theme\": { \"columns\": 3 },                # Optional
    \"pages\": { \"privacy\": \"markdown...\" }     # Optional
  }

Environment:
  AMZ_PARTNER_TAG   affiliate tag (required for build)
  CACHE_IMAGES      1 to mirror product images into assets/img/
  RUST_LOG          log filter override

Run 'shortlist gen-config' to generate a documented site_config.json.")]
#[command(version)]
struct Cli {
    /// Site config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = ".", global = true)]
    output: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the site: load → tag links → images → HTML
    Build(BuildArgs),
    /// Validate the config and product links without writing anything
    Check,
    /// Print a starter site_config.json with every option filled in
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    match cli.command {
        Command::Build(args) => {
            let options = pipeline::BuildOptions {
                config_path: cli.config.clone(),
                output_dir: cli.output.clone(),
                settings: BuildSettings::new(&args.partner_tag, args.cache_images)?,
                jobs: args.jobs,
                assets_dir: args.assets,
            };
            let fetcher = HttpFetcher::new()?;
            let updated = pipeline::utc_timestamp(chrono::Utc::now());

            println!(
                "==> Building {} \u{2192} {}",
                cli.config.display(),
                cli.output.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_materialize_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(&fetcher, &options, &updated, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;

            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let report = pipeline::check(&cli.config)?;
            output::print_check_output(&report);
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_site_config());
        }
    }

    Ok(())
}
