use clap::{ArgGroup, Parser, Subcommand};
use gramfeed::imaging::RustBackend;
use gramfeed::select::{self, Filter, ReviewOutcome, Stats};
use gramfeed::selection::Selection;
use gramfeed::{config, export, feed, generate, output, serve};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn version_string() -> &'static str {
    let hash = env!("GRAMFEED_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "gramfeed")]
#[command(about = "Static site and curated RSS feed from an Instagram export")]
#[command(long_about = "\
Static site and curated RSS feed from an Instagram export

Point it at an unpacked \"Download your information\" archive. Every post
becomes a page on the site; only the posts you select go into feed.xml.

Export layout (either format):

  insta-export/
  ├── your_instagram_activity/media/posts_1.json     # JSON export
  ├── your_instagram_activity/media/posts_1.html     # HTML export
  └── media/posts/202508/17912345.jpg                # referenced media

Typical workflow:

  gramfeed check                      # parse and report problems
  gramfeed select --year 2025         # bulk-select, then
  gramfeed select --review            # decide the rest one by one
  gramfeed generate                   # write site/ and site/feed.xml
  gramfeed serve                      # preview on http://127.0.0.1:8000/

Run 'gramfeed gen-config' to generate a documented gramfeed.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Unpacked Instagram export directory
    #[arg(long, default_value = "insta-export", global = true)]
    export: PathBuf,

    /// Config file (stock defaults are used when it does not exist)
    #[arg(long, default_value = "gramfeed.toml", global = true)]
    config: PathBuf,

    /// Output directory, overrides `output_dir` from the config
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the site for every post and the feed for the selected ones
    Generate,
    /// Curate which posts go into the feed
    Select(SelectArgs),
    /// Serve the output directory locally
    Serve {
        /// Port on 127.0.0.1, overrides `serve.port` from the config
        #[arg(long)]
        port: Option<u16>,
    },
    /// Parse the export and report posts and warnings without writing anything
    Check,
    /// Print a stock gramfeed.toml with all options documented
    GenConfig,
}

/// Bulk filters combine with AND; repeated `--year` or `--hashtag` values
/// combine with OR. Without any action flag the command starts a review.
#[derive(clap::Args)]
#[command(group(
    ArgGroup::new("filter")
        .multiple(true)
        .args(["all", "years", "from_year", "to_year", "hashtags", "with_hashtags", "location", "with_location"])
))]
struct SelectArgs {
    /// Match every post
    #[arg(long)]
    all: bool,
    /// Match posts from this year (repeatable)
    #[arg(long = "year", value_name = "YEAR")]
    years: Vec<i32>,
    /// Match posts from this year onwards
    #[arg(long, value_name = "YEAR")]
    from_year: Option<i32>,
    /// Match posts up to and including this year
    #[arg(long, value_name = "YEAR")]
    to_year: Option<i32>,
    /// Match posts carrying this hashtag, with or without `#` (repeatable)
    #[arg(long = "hashtag", value_name = "TAG")]
    hashtags: Vec<String>,
    /// Match posts with at least one hashtag
    #[arg(long)]
    with_hashtags: bool,
    /// Match posts whose location contains this text
    #[arg(long, value_name = "TEXT")]
    location: Option<String>,
    /// Match posts with a location
    #[arg(long)]
    with_location: bool,
    /// Deselect matching posts instead of selecting them
    #[arg(long, requires = "filter")]
    deselect: bool,
    /// Reset every decision to not selected before anything else
    #[arg(long)]
    clear: bool,
    /// Review undecided posts one by one
    #[arg(long)]
    review: bool,
    /// Print selection counts
    #[arg(long)]
    stats: bool,
    /// List the selected posts
    #[arg(long)]
    list: bool,
}

impl SelectArgs {
    fn filter(&self) -> Option<Filter> {
        let mut parts = Vec::new();
        if self.all {
            parts.push(Filter::All);
        }
        parts.extend(Filter::any_of(self.years.iter().copied().map(Filter::Year).collect()));
        match (self.from_year, self.to_year) {
            (Some(from), Some(to)) => parts.push(Filter::YearRange(from, to)),
            (Some(from), None) => parts.push(Filter::YearRange(from, i32::MAX)),
            (None, Some(to)) => parts.push(Filter::YearRange(i32::MIN, to)),
            (None, None) => {}
        }
        parts.extend(Filter::any_of(
            self.hashtags.iter().cloned().map(Filter::Hashtag).collect(),
        ));
        if self.with_hashtags {
            parts.push(Filter::HasHashtags);
        }
        if let Some(location) = &self.location {
            parts.push(Filter::Location(location.clone()));
        }
        if self.with_location {
            parts.push(Filter::HasLocation);
        }
        Filter::all_of(parts)
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gramfeed=info".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Check => {
            println!("==> Checking {}", cli.export.display());
            let report = export::parse_export(&cli.export)?;
            output::print_parse_report(&report, &cli.export);
            println!("==> Export is readable");
            return Ok(());
        }
        _ => {}
    }

    let site_config = config::load_config(&cli.config)?;
    let output_dir = cli.output.clone().unwrap_or_else(|| site_config.output_path());

    match cli.command {
        Command::Generate => {
            let report = export::parse_export(&cli.export)?;
            output::print_parse_report(&report, &cli.export);

            println!("==> Generating site → {}", output_dir.display());
            let summary =
                generate::generate(&report.posts, &site_config, &output_dir, &RustBackend::new())?;
            let selection = Selection::load_or_default(&site_config.selection_path());
            let items = feed::write_feed(&report.posts, &selection, &site_config, &output_dir)?;
            output::print_generate_summary(&summary, items);
        }
        Command::Select(args) => {
            let posts = export::parse_export(&cli.export)?.posts;
            let path = site_config.selection_path();
            let mut selection = Selection::load_for_update(&path)?;
            let filter = args.filter();
            let review = args.review || (filter.is_none() && !args.clear && !args.stats && !args.list);
            let mut changed = false;

            if args.clear {
                selection.clear();
                println!("Cleared all decisions");
                changed = true;
            }
            if let Some(filter) = &filter {
                let selected = !args.deselect;
                let matched = select::apply(&mut selection, &posts, filter, selected);
                println!(
                    "{}",
                    output::format_filter_result(matched, selected, selection.selected_count())
                );
                changed = true;
            }
            if review {
                let outcome = select::review(&posts, &mut selection, io::stdin().lock(), io::stdout().lock())?;
                match outcome {
                    ReviewOutcome::Done => changed = true,
                    ReviewOutcome::Quit => {
                        println!("Quit without saving");
                        return Ok(());
                    }
                }
            }
            if changed {
                selection.save(&path)?;
                println!("Saved {} selected posts to {}", selection.selected_count(), path.display());
            }
            if args.stats {
                output::print_stats(&Stats::collect(&posts, &selection));
            }
            if args.list {
                output::print_selected_list(&posts, &selection);
            }
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(site_config.serve.port);
            println!("==> Serving {} at http://127.0.0.1:{port}/ (Ctrl-C to stop)", output_dir.display());
            serve::serve(&output_dir, port)?;
        }
        Command::Check | Command::GenConfig => {}
    }

    Ok(())
}
