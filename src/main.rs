//! Blob Forge - Azure storage exposure scanner
//!
//! Feeds organization identifiers through the candidate pipeline, prints
//! confirmed storage accounts and exposed containers as they are found, and
//! exports blob listings for every exposed container to CSV.

use anyhow::{bail, Context};
use blob_forge::events::{EventSink, Level, Outcome, Phase, ProbeEvent};
use blob_forge::export::{BlobEnumerator, CsvExporter, RestBlobEnumerator};
use blob_forge::wordlist::load_wordlist;
use blob_forge::{ScanConfig, Scanner};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    let options = match Options::parse(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("❌ {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    init_tracing();
    if let Err(e) = blob_forge::init() {
        eprintln!("❌ Failed to initialize: {e}");
        process::exit(1);
    }

    if let Err(e) = run(options).await {
        eprintln!("❌ Error: {e:#}");
        process::exit(1);
    }
}

/// CLI options, parsed by hand.
struct Options {
    companies: PathBuf,
    keywords: PathBuf,
    resources: PathBuf,
    output: PathBuf,
    concurrency: usize,
    timeout_secs: u64,
    parallel_orgs: usize,
    export: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            companies: PathBuf::from("data/companies.txt"),
            keywords: PathBuf::from("data/keywords.txt"),
            resources: PathBuf::from("data/resources.txt"),
            output: PathBuf::from("output"),
            concurrency: 50,
            timeout_secs: 10,
            parallel_orgs: 1,
            export: true,
        }
    }
}

impl Options {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut options = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--companies" => options.companies = PathBuf::from(value(&mut iter, arg)?),
                "--keywords" => options.keywords = PathBuf::from(value(&mut iter, arg)?),
                "--resources" => options.resources = PathBuf::from(value(&mut iter, arg)?),
                "--output" => options.output = PathBuf::from(value(&mut iter, arg)?),
                "--concurrency" => {
                    options.concurrency = value(&mut iter, arg)?
                        .parse()
                        .context("--concurrency expects a number")?
                }
                "--timeout" => {
                    options.timeout_secs = value(&mut iter, arg)?
                        .parse()
                        .context("--timeout expects seconds")?
                }
                "--parallel-orgs" => {
                    options.parallel_orgs = value(&mut iter, arg)?
                        .parse()
                        .context("--parallel-orgs expects a number")?
                }
                "--no-export" => options.export = false,
                other => bail!("unknown option: {other}"),
            }
        }
        Ok(options)
    }
}

fn value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> anyhow::Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{flag} expects a value"))
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blob_forge=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(options: Options) -> anyhow::Result<()> {
    println!("🔍 blob-forge v{} - Azure storage exposure scanner", blob_forge::VERSION);
    println!("═══════════════════════════════════════════════════");

    let organizations =
        load_wordlist(&options.companies).context("loading organization list")?;
    let keywords = load_wordlist(&options.keywords).context("loading keyword list")?;
    let resources = load_wordlist(&options.resources).context("loading resource suffix list")?;

    println!("📋 Organizations: {}", organizations.len());
    println!("📋 Keywords: {}", keywords.len());
    println!("📋 Resource suffixes: {}", resources.len());
    println!();

    if organizations.is_empty() {
        bail!("organization list is empty: {}", options.companies.display());
    }
    if resources.is_empty() {
        bail!("resource suffix list is empty: {}", options.resources.display());
    }

    let mut config = ScanConfig::default();
    config.probe.concurrency = options.concurrency.max(1);
    config.probe.timeout = Duration::from_secs(options.timeout_secs.max(1));
    config.org_parallelism = options.parallel_orgs.max(1);

    let bar = ProgressBar::new(organizations.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("[{bar:30}] {pos}/{len} organizations {msg}")
            .expect("static template")
            .progress_chars("=> "),
    );

    let sink = Arc::new(ConsoleSink { bar: bar.clone() });
    let scanner = Scanner::with_sink(config.clone(), sink).context("initializing scanner")?;

    // Ctrl-C stops issuing new probes; in-flight ones settle.
    let cancel = scanner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let reports = scanner
        .scan(&organizations, &keywords, &resources, |progress| {
            bar.set_position(progress.organizations_done as u64);
            bar.set_message(format!(
                "{} accounts, {} containers",
                progress.accounts_confirmed, progress.containers_confirmed
            ));
        })
        .await;
    bar.finish_and_clear();

    let accounts: usize = reports.iter().map(|r| r.accounts.len()).sum();
    let containers: usize = reports.iter().map(|r| r.containers.len()).sum();
    println!();
    println!("✅ Scan complete: {accounts} storage accounts, {containers} exposed containers");

    if options.export && containers > 0 {
        println!();
        println!("💾 Exporting blob listings to {}", options.output.display());
        export_blobs(&config, &options.output, &reports).await?;
    }

    Ok(())
}

/// Enumerate blobs for every confirmed container and write one CSV per
/// container. Per-container failures are logged and skipped; one broken
/// container never aborts the export of the others.
async fn export_blobs(
    config: &ScanConfig,
    output: &PathBuf,
    reports: &[blob_forge::OrganizationReport],
) -> anyhow::Result<()> {
    let enumerator =
        RestBlobEnumerator::new(&config.probe).context("initializing blob enumerator")?;
    let exporter = CsvExporter::new(output);

    for report in reports {
        for hit in &report.containers {
            match enumerator.list_blobs(hit).await {
                Ok(blobs) if blobs.is_empty() => {
                    println!(
                        "   (empty) {}/{}",
                        hit.storage_account, hit.container_name
                    );
                }
                Ok(blobs) => {
                    let path = exporter
                        .write_blobs(&report.organization, hit, &blobs)
                        .with_context(|| {
                            format!(
                                "exporting {}/{}",
                                hit.storage_account, hit.container_name
                            )
                        })?;
                    println!("   {} blobs -> {}", blobs.len(), path.display());
                }
                Err(e) => {
                    tracing::warn!(
                        storage_account = %hit.storage_account,
                        container = %hit.container_name,
                        error = %e,
                        "blob enumeration failed"
                    );
                }
            }
        }
    }

    Ok(())
}

/// Console sink: prints findings above the progress bar, keeps the
/// high-volume negative outcomes silent.
struct ConsoleSink {
    bar: ProgressBar,
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: ProbeEvent) {
        match (event.level, event.outcome) {
            (_, Outcome::Confirmed) => {
                let label = match event.phase {
                    Phase::AccountProbe => "✅ Storage account found",
                    Phase::ContainerProbe => "📦 Exposed container found",
                };
                self.bar.println(format!("{label}: {}", event.endpoint));
            }
            (Level::Warn, Outcome::Retried) => {
                self.bar.println(format!(
                    "⚠️  Retrying {}: {}",
                    event.endpoint,
                    event.detail.unwrap_or_default()
                ));
            }
            (Level::Error, _) => {
                self.bar.println(format!(
                    "❗ Probe error for {}: {}",
                    event.endpoint,
                    event.detail.unwrap_or_default()
                ));
            }
            _ => {}
        }
    }
}

fn print_help() {
    println!("🔍 blob-forge - Azure storage exposure scanner");
    println!();
    println!("Generates storage account and container name candidates from organization");
    println!("identifiers and a keyword list, confirms them with concurrent DNS and");
    println!("anonymous HTTP probes, and exports blob listings of exposed containers.");
    println!();
    println!("USAGE:");
    println!("    blob-forge [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --companies <path>      Organization list (default: data/companies.txt)");
    println!("    --keywords <path>       Keyword list (default: data/keywords.txt)");
    println!("    --resources <path>      Resource suffix list (default: data/resources.txt)");
    println!("    --output <dir>          CSV output directory (default: output)");
    println!("    --concurrency <n>       Max in-flight probes per phase (default: 50)");
    println!("    --timeout <secs>        Per-request timeout (default: 10)");
    println!("    --parallel-orgs <n>     Organizations scanned in parallel (default: 1)");
    println!("    --no-export             Skip blob enumeration and CSV export");
    println!("    -h, --help              Show this help");
    println!();
    println!("Wordlist format: one token per line, '#' starts a comment line.");
}
