use anyhow::Context;
use clap::Parser;
use rapiddl::{download_media, Credentials, DownloadConfig};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "rapiddl")]
#[command(about = "Download media from RapidGator into a library directory", long_about = None)]
#[command(version)]
struct Args {
    /// One or more links to the parts of a single asset
    #[arg(short, long, num_args = 1..)]
    link: Vec<String>,

    /// File containing one link per line (alternative to --link)
    #[arg(long, conflicts_with = "link")]
    link_file: Option<PathBuf>,

    /// Destination directory for the final media file(s)
    #[arg(short, long)]
    dest: PathBuf,

    /// Optional base filename for delivered artifacts
    #[arg(short, long)]
    name: Option<String>,

    /// Deliver archives as-is instead of extracting them
    #[arg(long)]
    no_extract: bool,

    /// Account username (email)
    #[arg(short, long)]
    username: Option<String>,

    /// Account password
    #[arg(short, long)]
    password: Option<String>,

    /// JSON credential file used when --username/--password are absent
    #[arg(long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Staging parent directory
    #[arg(long, default_value = "staging")]
    staging_dir: PathBuf,

    /// Increase verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_links(args: &Args) -> anyhow::Result<Vec<String>> {
    if let Some(path) = &args.link_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read link file {}", path.display()))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    } else {
        Ok(args.link.clone())
    }
}

fn load_credentials(args: &Args) -> anyhow::Result<Credentials> {
    match (&args.username, &args.password) {
        (Some(email), Some(password)) => Ok(Credentials {
            email: email.clone(),
            password: password.clone(),
        }),
        _ => Credentials::load(&args.credentials).with_context(|| {
            format!(
                "no --username/--password given and credential file {} unusable",
                args.credentials.display()
            )
        }),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("rapiddl={}", log_level))
        .init();

    let links = load_links(&args)?;
    if links.is_empty() {
        eprintln!("Error: at least one link must be specified");
        std::process::exit(1);
    }

    let credentials = load_credentials(&args)?;

    let config = DownloadConfig {
        destination: args.dest,
        output_name: args.name,
        staging_parent: args.staging_dir,
        extract: !args.no_extract,
        ..DownloadConfig::default()
    };

    info!("downloading {} part(s) to {:?}", links.len(), config.destination);

    match download_media(&config, &credentials, &links).await {
        Ok(delivered) => {
            for path in &delivered.final_paths {
                println!("{}", path.display());
            }
            info!("delivered {} artifact(s)", delivered.final_paths.len());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
