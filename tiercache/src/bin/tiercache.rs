use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tiercache::config::CacheSettings;
use tiercache::remote::{RemoteCacheClient, Tag, TagExpression};
use tiercache::report;

#[derive(Parser, Debug)]
#[command(name = "tiercache", version, about = "Inspect and invalidate a tiercache remote tier")]
struct Cli {
    /// YAML settings file
    #[arg(short, long, env = "TIERCACHE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List metadata keys by age, flagging those older than THRESHOLD seconds
    Report {
        #[arg(allow_negative_numbers = true)]
        threshold: Option<i64>,
    },
    /// Delete every key matching the tag groups; `a,b c` means (a AND b) OR c
    Invalidate {
        #[arg(required = true)]
        groups: Vec<String>,
    },
}

fn expression(groups: &[String]) -> TagExpression {
    let mut groups: Vec<Vec<Tag>> =
        groups.iter().map(|group| Tag::split_list(group)).collect();
    if groups.len() == 1 {
        TagExpression::Flat(groups.remove(0))
    } else {
        TagExpression::Grouped(groups)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tiercache::logging::init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => CacheSettings::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => CacheSettings::default(),
    }
    .with_env();

    let client = RemoteCacheClient::connect_with(
        &settings.remote.dsn,
        tiercache::connect_options(&settings),
    )
    .await?;

    match cli.command {
        Command::Report { threshold } => {
            let threshold = match threshold {
                Some(raw) => report::validate_threshold(raw)?,
                None => report::validate_threshold(settings.report.threshold as i64)?,
            };
            let lines = report::collect(&client, threshold, chrono::Utc::now()).await?;
            for line in lines {
                println!("{}", line);
            }
        }
        Command::Invalidate { groups } => {
            let result = client.remove_keys_from_tags(expression(&groups)).await?;
            for key in &result.attempted {
                println!("{}", key);
            }
            if result.already_gone() > 0 {
                tracing::warn!(
                    "{} matched keys were already absent",
                    result.already_gone()
                );
            }
            println!(
                "attempted: {}, deleted: {}",
                result.attempted.len(),
                result.really_deleted
            );
        }
    }
    Ok(())
}
