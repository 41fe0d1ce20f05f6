use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use crate::analysis::{ReactionReport, ReplyGraph};
use crate::clustering::{Clustering, ReductionMethod};
use crate::config::{Config, load_config};
use crate::pipeline::{Dataset, DatasetStats, run_and_write};
use crate::report::clusters_csv;
use crate::utils::format_path_with_tilde;

#[derive(Parser)]
#[command(name = "chat-insights")]
#[command(version)]
#[command(about = "Reply dynamics, reaction times and writing style in chat exports", long_about = None)]
pub struct Cli {
    /// Configuration file (default: $CHAT_INSIGHTS_CONFIG or ./chat-insights.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every analysis and write the reports to the output folder
    Run {
        /// Write reports here instead of the configured output folder
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show message, author and role counts for the export
    Stats,
    /// Show the reaction-time distribution of replies
    Reactions,
    /// Show who replies to whom, by role
    Replies,
    /// Project text fragments to 2-D and print the coordinates as CSV
    Cluster {
        /// Override the configured projection method
        #[arg(short, long, value_enum)]
        method: Option<ReductionMethod>,
    },
}

pub fn run() -> Result<()> {
    execute(Cli::parse())
}

pub fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    match command {
        Commands::Run { output } => run_all(&config, output)?,
        Commands::Stats => show_stats(&config)?,
        Commands::Reactions => show_reactions(&config)?,
        Commands::Replies => show_replies(&config)?,
        Commands::Cluster { method } => show_clusters(&config, method)?,
    }

    Ok(())
}

fn run_all(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let folder = output.unwrap_or_else(|| config.output_folder.clone());
    let (report, written) = run_and_write(config, &folder)?;

    println!("Reports written to {}", format_path_with_tilde(&folder));
    for path in &written {
        println!("  {}", format_path_with_tilde(path));
    }
    print_stats(&report.stats);
    if !report.failures.is_empty() {
        println!();
        println!("Skipped analyses:");
        for failure in &report.failures {
            println!("  {}: {}", failure.step, failure.error);
        }
        bail!("{} of 3 analyses failed", report.failures.len());
    }
    Ok(())
}

fn print_stats(stats: &DatasetStats) {
    println!("Chat Export Statistics");
    println!("======================");
    println!("Messages: {}", stats.messages);
    println!("Authors: {}", stats.authors);
    println!("  With a role: {} messages", stats.roled_messages);
    println!("  Dropped (no role): {} messages", stats.dropped_messages);
    if !stats.unrostered_authors.is_empty() {
        println!("  Unrostered authors: {}", stats.unrostered_authors.join(", "));
    }
    println!("Roles: {}", stats.roles);
    println!("Media messages: {}", stats.media_messages);
    println!("Payment links: {}", stats.payment_messages);
    if let Some(first) = stats.first_message {
        println!("First message: {}", first.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(last) = stats.last_message {
        println!("Last message: {}", last.format("%Y-%m-%d %H:%M:%S"));
    }
}

fn show_stats(config: &Config) -> Result<()> {
    let dataset = Dataset::load(config)?;
    print_stats(&dataset.stats());
    println!();
    println!("Messages file: {}", format_path_with_tilde(&config.messages_file));
    println!("Roles file: {}", format_path_with_tilde(&config.roles_file));
    Ok(())
}

fn print_reactions(report: &ReactionReport) {
    println!("{:<12} {:>7} {:>8} {:>11}", "Bucket", "Replies", "Share", "Cumulative");
    for bucket in &report.buckets {
        println!(
            "{:<12} {:>7} {:>7.1}% {:>10.1}%",
            bucket.label,
            bucket.count,
            bucket.percentage * 100.0,
            bucket.cumulative_percentage * 100.0
        );
    }
    println!("Total replies: {}", report.total_replies);
}

fn show_reactions(config: &Config) -> Result<()> {
    let dataset = Dataset::load(config)?;
    let report = dataset.reactions(config.boundaries()?)?;
    print_reactions(&report);
    Ok(())
}

fn print_reply_graph(graph: &ReplyGraph) {
    let width = graph.roles.iter().map(String::len).max().unwrap_or(0).max(8);

    print!("{:<width$}", "from \\ to", width = width + 2);
    for role in &graph.roles {
        print!(" {:>width$}", role, width = width);
    }
    println!();
    for (i, role) in graph.roles.iter().enumerate() {
        print!("{:<width$}", role, width = width + 2);
        match &graph.percentages[i] {
            Some(row) => row.iter().for_each(|p| print!(" {:>w$.1}%", p * 100.0, w = width - 1)),
            None => graph.roles.iter().for_each(|_| print!(" {:>width$}", "-", width = width)),
        }
        println!();
    }

    println!();
    println!(
        "{:<width$} {:>8} {:>9} {:>8}",
        "Role",
        "Authors",
        "Messages",
        "Replies",
        width = width
    );
    for (i, summary) in graph.summary.iter().enumerate() {
        println!(
            "{:<width$} {:>8} {:>9} {:>8}",
            summary.role,
            summary.authors,
            summary.messages,
            graph.row_total(i),
            width = width
        );
    }
    if graph.unattributed_replies > 0 {
        println!("Replies to authors without a role: {}", graph.unattributed_replies);
    }
}

fn show_replies(config: &Config) -> Result<()> {
    let dataset = Dataset::load(config)?;
    print_reply_graph(&dataset.reply_graph()?);
    Ok(())
}

fn print_clusters(clustering: &Clustering) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&clusters_csv(clustering)?)?;
    Ok(())
}

fn show_clusters(config: &Config, method: Option<ReductionMethod>) -> Result<()> {
    let dataset = Dataset::load(config)?;
    let mut options = config.cluster_options();
    if let Some(method) = method {
        options.method = method;
    }
    print_clusters(&dataset.clustering(&options)?)
}
