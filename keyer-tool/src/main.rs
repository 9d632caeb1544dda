//! Layout scoring tool.
//!
//! Host-side companion to the layout search: scores candidate layouts
//! against a reference corpus, sanity-checks layout files, and ranks
//! alternatives.  Layout files are JSON objects mapping single-character
//! strings to lists of chord strings, the shape the search emits.

use std::collections::BTreeMap;
use std::fs::{self, File};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use keyer_score::{score_layout, KeyMap};

#[derive(Parser)]
#[command(name = "keyer-tool")]
#[command(about = "Score and inspect chord keyboard layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a layout against a text corpus
    Score {
        /// Layout file
        #[arg(short, long, value_name = "FILE")]
        layout: String,

        /// Corpus to replay
        #[arg(short, long, value_name = "FILE")]
        text: String,
    },

    /// Validate a layout file and report character coverage
    Check {
        /// Layout file
        layout: String,
    },

    /// Score several layouts against the same corpus and rank them
    Compare {
        /// Corpus to replay
        #[arg(short, long, value_name = "FILE")]
        text: String,

        /// Layout files to rank
        #[arg(required = true)]
        layouts: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Score { layout, text } => {
            let map = load_layout(layout)?;
            let corpus = load_corpus(text)?;
            let cost = score_layout(&map, &corpus)?;
            println!("{}: {} ms over {} bytes", layout, cost, corpus.len());
            if !corpus.is_empty() {
                println!("  {:.1} ms per byte", cost as f64 / corpus.len() as f64);
            }
        }
        Commands::Check { layout } => {
            let map = load_layout(layout)?;
            KeyMap::from_layout(&map).with_context(|| format!("invalid layout {}", layout))?;

            let missing: Vec<char> = (0x20u8..0x7f)
                .map(char::from)
                .filter(|ch| !map.contains_key(&ch.to_string()))
                .collect();
            println!("{}: {} characters mapped", layout, map.len());
            if missing.is_empty() {
                println!("  all printable ASCII covered");
            } else {
                println!("  not covered: {:?}", missing.iter().collect::<String>());
            }
        }
        Commands::Compare { text, layouts } => {
            let corpus = load_corpus(text)?;
            let mut ranked = Vec::new();
            for layout in layouts {
                let map = load_layout(layout)?;
                let cost = score_layout(&map, &corpus)
                    .with_context(|| format!("scoring {}", layout))?;
                ranked.push((cost, layout));
            }
            ranked.sort();
            for (place, (cost, layout)) in ranked.iter().enumerate() {
                println!("{}. {} ms  {}", place + 1, cost, layout);
            }
        }
    }

    Ok(())
}

fn load_layout(path: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let file = File::open(path).with_context(|| format!("opening layout {}", path))?;
    let map = serde_json::from_reader(file).with_context(|| format!("parsing layout {}", path))?;
    Ok(map)
}

fn load_corpus(path: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading corpus {}", path))
}
