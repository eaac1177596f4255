use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dqweb::{
    config::{config_path, get_default_config_toml, load_config, Config},
    dto::{AvailabilityStatus, DomainCheckResult, Filter, NdjsonLine},
    logging::init_logger,
    server::serve,
};
use futures::StreamExt;
use libdomain_sweep::{
    names::{expand_extensions, normalize_bases},
    Prober,
};
use std::{
    collections::HashMap,
    io::{self, BufRead, Write},
    net::SocketAddr,
    path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(name = "dqw")]
#[command(about = "Bulk domain availability checks over DNS, HTTP and RDAP", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP endpoint
    Serve {
        /// Address to listen on, overriding the config
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Check base names from the command line, or stdin when none are given
    Check {
        /// Base names to check (extensions are stripped and re-appended)
        names: Vec<String>,

        /// Output results as NDJSON stream (one JSON object per line)
        #[arg(long, short = 'j')]
        ndjson: bool,

        /// Only print domains that are not available
        #[arg(long)]
        taken_only: bool,

        /// Comma-separated extensions to use instead of the configured ones (e.g., .net,.io)
        #[arg(long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", get_default_config_toml());
        return Ok(());
    }

    if args.write_default_config {
        let Some(path) = config_path() else {
            bail!("could not determine config path");
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, get_default_config_toml())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Default config written to: {}", path.display());
        return Ok(());
    }

    init_logger(args.verbose);
    let mut config = load_config(args.config.as_deref());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        match args.command {
            Some(Command::Serve { bind }) => {
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                serve(config).await
            }
            Some(Command::Check {
                names,
                ndjson,
                taken_only,
                extensions,
            }) => {
                if let Some(extensions) = extensions {
                    config.extensions.list = extensions;
                }
                let names = if names.is_empty() { read_stdin_names()? } else { names };
                run_check(&config, names, ndjson, taken_only).await
            }
            None => {
                bail!("no command given, try `dqw serve` or `dqw check <NAME>...`");
            }
        }
    })
}

fn read_stdin_names() -> Result<Vec<String>> {
    io::stdin()
        .lock()
        .lines()
        .map(|line| line.map_err(Into::into))
        .collect()
}

async fn run_check(config: &Config, names: Vec<String>, ndjson: bool, taken_only: bool) -> Result<()> {
    let extensions = config.extensions.resolve();
    let bases = normalize_bases(&names, &extensions);
    if bases.is_empty() {
        bail!("no usable domain names given");
    }

    let prober = Prober::with_config(config.probe.to_probe_config())?;

    if ndjson {
        run_ndjson(&prober, &bases, &extensions, taken_only).await
    } else {
        run_text(&prober, &bases, &extensions, taken_only).await
    }
}

/// Streams results as they complete, in no particular order.
async fn run_ndjson(
    prober: &Prober,
    bases: &[String],
    extensions: &[String],
    taken_only: bool,
) -> Result<()> {
    // Overlapping extensions can map two bases onto one hostname.
    let mut bases_of: HashMap<String, Vec<String>> = HashMap::new();
    let mut domains = Vec::new();
    for base in bases {
        for domain in expand_extensions(base, extensions) {
            let owners = bases_of.entry(domain.clone()).or_default();
            if owners.is_empty() {
                domains.push(domain);
            }
            owners.push(base.clone());
        }
    }

    let mut stream = prober.probe_stream(domains);
    let mut stdout = io::stdout();

    while let Some(result) = stream.next().await {
        let queries = bases_of.get(&result.domain).cloned().unwrap_or_default();
        let result = DomainCheckResult::from(result);
        if taken_only && !Filter::Taken.keeps(result.status) {
            continue;
        }

        for query in queries {
            let line = NdjsonLine {
                query,
                result: result.clone(),
            };
            writeln!(stdout, "{}", serde_json::to_string(&line)?)?;
        }
        stdout.flush()?;
    }

    Ok(())
}

async fn run_text(
    prober: &Prober,
    bases: &[String],
    extensions: &[String],
    taken_only: bool,
) -> Result<()> {
    let reports = prober.probe_names(bases, extensions).await;
    let mut taken = 0;

    for report in reports {
        println!("{}", style(&report.base).bold());
        for result in report.results {
            let result = DomainCheckResult::from(result);

            let line = match result.status {
                AvailabilityStatus::Taken => {
                    taken += 1;
                    format!("  {} {:<30} {}", style("✗").red().bold(), result.domain, style("taken").red())
                }
                AvailabilityStatus::Available if taken_only => continue,
                AvailabilityStatus::Available => format!(
                    "  {} {:<30} {}",
                    style("✓").green().bold(),
                    result.domain,
                    style("available").green()
                ),
                AvailabilityStatus::Error | AvailabilityStatus::Unknown => format!(
                    "  {} {:<30} {}",
                    style("!").magenta().bold(),
                    result.domain,
                    style(result.reason.as_deref().unwrap_or("unknown")).magenta()
                ),
            };
            println!("{}", line);
        }
    }

    println!();
    println!("{}", style(format!("{} taken", taken)).dim());
    Ok(())
}
