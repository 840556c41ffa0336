use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

use movie_scraper::config::Settings;
use movie_scraper::db;
use movie_scraper::driver::ChromeDriver;
use movie_scraper::images::HttpImages;
use movie_scraper::pipeline::{Phase, Pipeline, RunReport};
use movie_scraper::staging::StagingStore;
use movie_scraper::waits::Pacing;
use movie_scraper::Site;

#[derive(Parser)]
#[command(name = "movie_scraper", about = "Movie scraper for epika.lrt.lt and the lrt.lt mediateka")]
struct Cli {
    /// Settings file (default: movie_scraper.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Show the browser window while scraping
    #[arg(short = 'b', long, global = true)]
    show_browser: bool,
    /// Use the demo databases and a short epika search list
    #[arg(long, global = true)]
    demo: bool,
    /// Comma separated epika search terms
    #[arg(long, global = true, value_delimiter = ',')]
    terms: Option<Vec<String>>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the movies table in both databases
    Init,
    /// Shallow pass: collect candidates into the staging file
    Discover {
        #[arg(short, long, value_enum, default_value = "all")]
        site: SiteArg,
    },
    /// Deep pass: enrich staged candidates and commit them
    Enrich {
        #[arg(short, long, value_enum, default_value = "all")]
        site: SiteArg,
    },
    /// Discover (unless already staged), enrich and commit
    Run {
        #[arg(short, long, value_enum, default_value = "all")]
        site: SiteArg,
    },
    /// Row counts and field coverage per database
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum SiteArg {
    Epika,
    Mediateka,
    All,
}

impl SiteArg {
    fn sites(self) -> Vec<Site> {
        match self {
            SiteArg::Epika => vec![Site::Epika],
            SiteArg::Mediateka => vec![Site::Mediateka],
            SiteArg::All => Site::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    if cli.show_browser {
        settings.browser.show = true;
    }
    if cli.demo {
        settings = settings.into_demo(cli.terms);
    } else if let Some(terms) = cli.terms {
        settings.epika.search_terms = terms;
    }

    let result = match cli.command {
        Commands::Init => init(&settings),
        Commands::Discover { site } => run_sites(&settings, site.sites(), Phase::Discover).await,
        Commands::Enrich { site } => run_sites(&settings, site.sites(), Phase::Enrich).await,
        Commands::Run { site } => run_sites(&settings, site.sites(), Phase::Full).await,
        Commands::Stats => stats(&settings),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn init(settings: &Settings) -> anyhow::Result<()> {
    for site in Site::ALL {
        let path = settings.database_path(site);
        let conn = db::connect(path).with_context(|| format!("failed to open {}", path.display()))?;
        db::init_schema(&conn)?;
        println!("[{}] schema ready in {}", site, path.display());
    }
    Ok(())
}

/// Sites run one after another. A failing site, setup included, is logged
/// and counted; the remaining sites still run.
async fn run_sites(settings: &Settings, sites: Vec<Site>, phase: Phase) -> anyhow::Result<()> {
    let images = HttpImages::new();
    let staging = StagingStore::new(&settings.storage.staging_dir);
    let mut failed = 0usize;

    for site in sites {
        match run_site(settings, site, phase, &images, &staging).await {
            Ok(report) => report.print(),
            Err(e) => {
                error!(%site, error = %format!("{e:#}"), "site run failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} site run(s) failed");
    }
    Ok(())
}

/// One site's run with its own connection and browser session. The browser
/// is closed whatever the pipeline returns.
async fn run_site(
    settings: &Settings,
    site: Site,
    phase: Phase,
    images: &HttpImages,
    staging: &StagingStore,
) -> anyhow::Result<RunReport> {
    let path = settings.database_path(site);
    let conn = db::connect(path).with_context(|| format!("failed to open {}", path.display()))?;
    db::init_schema(&conn)?;

    let driver = ChromeDriver::launch(settings.browser.show)
        .await
        .context("failed to start browser")?;

    let outcome = Pipeline::new(&driver, images, &conn, staging, Pacing::from(&settings.pacing))
        .accept_partial(settings.accept_partial)
        .run_phase(site, phase, settings)
        .await;

    driver.close().await;
    Ok(outcome?)
}

fn stats(settings: &Settings) -> anyhow::Result<()> {
    let staging = StagingStore::new(&settings.storage.staging_dir);

    println!(
        "{:<10} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6} | {:<7}",
        "Site", "Movies", "Image", "Descr", "Year", "Length", "Genre", "Views", "Staged"
    );
    println!("{}", "-".repeat(84));

    for site in Site::ALL {
        let path = settings.database_path(site);
        let conn = db::connect(path).with_context(|| format!("failed to open {}", path.display()))?;
        db::init_schema(&conn)?;
        let s = db::get_stats(&conn)?;
        println!(
            "{:<10} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6} | {:<7}",
            site,
            s.total,
            s.with_image,
            s.with_description,
            s.with_year,
            s.with_duration,
            s.with_genre,
            s.with_views,
            if staging.exists(site) { "yes" } else { "no" },
        );
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
