//! Command line interface

use clap::Parser;
use problem_crawler::{Config, Result, Site};
use std::path::PathBuf;

/// Crawl all problems from leetcode.com or leetcode.cn
#[derive(Debug, Parser)]
#[command(name = "problem-crawler", version, about)]
pub struct Cli {
    /// Use leetcode.cn instead of leetcode.com
    #[arg(short = 'c', long)]
    pub cn: bool,

    /// Output directory
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Metadata snapshot to use instead of fetching the index
    #[arg(short = 'm', long, value_name = "FILE")]
    pub metadata_file: Option<PathBuf>,

    /// Re-fetch problems that already have an output file
    #[arg(short = 'u', long)]
    pub update: bool,

    /// First problem id to fetch (inclusive)
    #[arg(short = 's', long, value_name = "ID")]
    pub start: Option<u32>,

    /// Last problem id to fetch (inclusive)
    #[arg(short = 'e', long, value_name = "ID")]
    pub end: Option<u32>,

    /// Save the fetched metadata index to this file
    #[arg(long, value_name = "FILE", conflicts_with = "metadata_file")]
    pub save_metadata: Option<PathBuf>,

    /// JSON configuration file; flags given here take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Attempts per problem before giving up
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the run configuration: file (or defaults) first, then flags
    pub fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if self.cn {
            config.site = Site::Cn;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(path) = &self.metadata_file {
            config.metadata_file = Some(path.clone());
        }
        if let Some(path) = &self.save_metadata {
            config.save_metadata = Some(path.clone());
        }
        if self.update {
            config.update = true;
        }
        if self.start.is_some() {
            config.range.start = self.start;
        }
        if self.end.is_some() {
            config.range.end = self.end;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
        }

        config.validate()?;
        Ok(config)
    }
}
