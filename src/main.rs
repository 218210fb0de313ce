use clap::{Parser, Subcommand};
use pressroom::article::ArticleBuilder;
use pressroom::imaging::RustBackend;
use pressroom::{config, output};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that export images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the image cache and re-encode every image
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "pressroom")]
#[command(about = "Build pipeline for markdown articles")]
#[command(long_about = "\
Build pipeline for markdown articles

Each article is a directory holding its markdown, a metadata descriptor and
the images it references:

  data/articles/
  └── the-art-of-war/              # slug = directory name
      ├── article.md               # # Title, **Lede.**, body
      ├── metadata.json            # category, author, publishedAt, timestamp, keywords
      └── photos/beach.png         # referenced as ![alt](photos/beach.png)

Images are re-encoded to JPEG under public/article/<slug>/ with the SHA-256
of their bytes in the file name, so unchanged images are never encoded twice.

Set PRESSROOM_LOG=debug for diagnostic logging on stderr.
Run 'pressroom gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site configuration file (defaults apply when it does not exist)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Directory for build output records (articles.json)
    #[arg(long, default_value = ".pressroom-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build every article and write articles.json
    Build(CacheArgs),
    /// Build a single article and print its record
    Article {
        /// Directory name under the articles root
        slug: String,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Build(cache_args) => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let backend = RustBackend::new();
            let builder =
                ArticleBuilder::new(&backend, &site_config).force(cache_args.no_cache);

            println!("==> Building articles in {}", site_config.articles_dir);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_build_event(&event);
                }
            });
            let report = builder.build_all(Some(tx))?;
            printer.join().map_err(|_| "output thread panicked")?;

            std::fs::create_dir_all(&cli.temp_dir)?;
            let records_path = cli.temp_dir.join("articles.json");
            let json = serde_json::to_string_pretty(&report.articles)?;
            std::fs::write(&records_path, json)?;

            output::print_report(&report);
            if !report.is_success() {
                return Err(format!("{} article(s) failed", report.failures.len()).into());
            }
            println!("==> Build complete: {}", records_path.display());
        }
        Command::Article { slug, cache } => {
            let site_config = config::load_config(&cli.config)?;
            let backend = RustBackend::new();
            let builder = ArticleBuilder::new(&backend, &site_config).force(cache.no_cache);
            let record = builder
                .build_article(&slug)
                .map_err(|e| format!("{slug}: {e}"))?;
            output::print_article(&record);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}

/// Diagnostic logging to stderr, filtered by `PRESSROOM_LOG` (default `warn`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("PRESSROOM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
