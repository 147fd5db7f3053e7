//! Command line arguments for the `booktrends` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::standalone::PipelineConfig;

pub mod logging;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every stage over a corpus of `bookID,title,year,content` files
    Run {
        /// Glob spec or directory for the input files
        #[arg(short, long)]
        input: String,

        /// Output directory, one subdirectory per stage
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: StageOptions,

        /// Auxiliary arguments passed to every stage.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
    /// Run a single stage
    Submit {
        /// Glob spec or directory for the input files
        #[arg(short, long)]
        input: String,

        /// Name of the stage: clean, frequency, decade, sentiment or sentiment-text
        #[arg(short, long)]
        workload: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: StageOptions,

        /// Auxiliary arguments to pass to the stage.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct StageOptions {
    /// Lemmatization table, one `surfaceWord lemma` pair per line
    #[arg(long)]
    pub lemmas: Option<PathBuf>,

    /// Sentiment lexicon, one `word score` pair per line
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    /// Number of reduce buckets per stage
    #[arg(short = 'r', long, default_value_t = 4)]
    pub reducers: u32,

    /// Maximum number of input lines per map task
    #[arg(long, default_value_t = 10_000)]
    pub split_lines: usize,
}

impl StageOptions {
    pub fn config(&self, args: Vec<String>) -> PipelineConfig {
        PipelineConfig {
            n_reduce: self.reducers,
            split_lines: self.split_lines,
            lemmas: self.lemmas.clone(),
            lexicon: self.lexicon.clone(),
            args,
        }
    }
}
