// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! kvtree-dump CLI tool
//!
//! Operational inspection for a single tree file: meta fields, node counts
//! by type, and ad-hoc point/range queries. Diagnostic convenience, not
//! part of the programmatic surface.

use clap::{Parser, Subcommand};
use kvtree::{BPlusTree, OpenFlags};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kvtree-dump")]
#[command(author = "Vivian Voss <ask@vvoss.dev>")]
#[command(version = "0.1.0")]
#[command(about = "Inspect a kvtree B+tree file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print meta fields and node counts by type
    Stats {
        /// Path to the tree file
        path: PathBuf,
    },

    /// Point lookup for a single key
    Get {
        /// Path to the tree file
        path: PathBuf,

        /// Key to look up
        key: u64,

        /// Maximum number of values to print
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },

    /// Range lookup over a closed interval
    Range {
        /// Path to the tree file
        path: PathBuf,

        /// Lower bound, inclusive
        min: u64,

        /// Upper bound, inclusive
        max: u64,

        /// Maximum number of values to print
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { path } => {
            let mut tree = BPlusTree::open(OpenFlags::open_existing(path))?;
            let (leaves, internals) = tree.node_type_counts()?;
            println!("order:       {}", tree.order().value());
            println!("block_count: {}", tree.block_count());
            println!("max_blkid:   {}", tree.max_blkid());
            println!("root_blkid:  {}", tree.root_blkid());
            println!("leaf nodes:     {}", leaves);
            println!("internal nodes: {}", internals);
        }

        Commands::Get { path, key, limit } => {
            let mut tree = BPlusTree::open(OpenFlags::open_existing(path))?;
            let values = tree.point_search(limit, key)?;
            for v in values {
                println!("{}", v);
            }
        }

        Commands::Range { path, min, max, limit } => {
            let mut tree = BPlusTree::open(OpenFlags::open_existing(path))?;
            let values = tree.range_search(limit, min, max)?;
            for v in values {
                println!("{}", v);
            }
        }
    }

    Ok(())
}
