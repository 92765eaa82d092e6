use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;
use tracing::{error, info, warn};

use member_harvest::core::config::load_harvest_config;
use member_harvest::export::{to_clipboard_text, write_csv, ColumnLabels};
use member_harvest::scraping::browser_manager::{AttachedBrowser, DEFAULT_TAB_FRAGMENT};
use member_harvest::scraping::CdpPageHost;
use member_harvest::{Harvester, Record, Reporter, TracingReporter};

const USAGE: &str = "\
usage: member-harvest [--connect URL] [--tab FRAGMENT] [--html FILE] [--out DIR] [--tsv] [--labels en|he]

  --connect URL     remote-debugging endpoint of the running browser (default http://127.0.0.1:9222)
  --tab FRAGMENT    pick the tab whose URL contains FRAGMENT (default /requests)
  --html FILE       scan a saved page snapshot instead of a live tab
  --out DIR         directory for the CSV file (default: current directory)
  --tsv             also print the records as tab-separated text on stdout
  --labels en|he    CSV / TSV header language";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    connect: Option<String>,
    tab: Option<String>,
    html: Option<PathBuf>,
    out: Option<PathBuf>,
    tsv: bool,
    labels: Option<String>,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };

        match flag.as_str() {
            "--tsv" => parsed.tsv = true,
            "-h" | "--help" => parsed.help = true,
            "--connect" | "--tab" | "--html" | "--out" | "--labels" => {
                let value = match inline {
                    Some(v) => v,
                    None => args
                        .next()
                        .ok_or_else(|| anyhow!("{} needs a value", flag))?,
                };
                match flag.as_str() {
                    "--connect" => parsed.connect = Some(value),
                    "--tab" => parsed.tab = Some(value),
                    "--html" => parsed.html = Some(PathBuf::from(value)),
                    "--out" => parsed.out = Some(PathBuf::from(value)),
                    _ => parsed.labels = Some(value),
                }
            }
            other => bail!("unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,chromiumoxide=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let args = parse_args(std::env::args().skip(1)).map_err(|e| anyhow!("{}\n\n{}", e, USAGE))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(0);
    }

    let config = load_harvest_config();
    let labels = match args.labels.as_deref().or(config.export.labels.as_deref()) {
        Some(code) => ColumnLabels::from_code(code)?,
        None => ColumnLabels::default(),
    };
    let harvester = Harvester::new(config);
    let reporter = TracingReporter;

    let records: Vec<Record> = match &args.html {
        Some(path) => {
            info!("scanning saved snapshot {}", path.display());
            let html = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| anyhow!("failed to read {}: {}", path.display(), e))?;
            let (_, records) = harvester.scan_html(&html);
            reporter.on_complete(&records);
            records
        }
        None => {
            let debug_url = args
                .connect
                .clone()
                .unwrap_or_else(|| harvester.config().resolve_debug_url());
            let mut attached = AttachedBrowser::connect(&debug_url).await?;
            let page = attached
                .select_tab(args.tab.as_deref().unwrap_or(DEFAULT_TAB_FRAGMENT))
                .await?;
            let host = CdpPageHost::new(page);

            let outcome = harvester.run(&host, &reporter).await;
            attached.detach();
            let outcome = outcome?;
            if !outcome.pagination.converged {
                warn!("the list may be incomplete: scrolling hit its step limit");
            }
            outcome.records
        }
    };

    if records.is_empty() {
        eprintln!("No member requests found.");
        return Ok(1);
    }

    if args.tsv {
        println!("{}", to_clipboard_text(&records, &labels));
    }

    let out_dir = args.out.unwrap_or_else(|| PathBuf::from("."));
    match write_csv(&out_dir, &records, &labels) {
        Ok(path) => {
            eprintln!("Saved {} request(s) to {}", records.len(), path.display());
            Ok(0)
        }
        Err(e) => {
            error!("export failed, {} record(s) were collected: {}", records.len(), e);
            Ok(2)
        }
    }
}
