use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use error::Error;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use redblack::RedBlackTree;
use render::{Options, Style, render};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};

mod error;
mod render;
mod script;

#[derive(clap::Parser)]
#[command(name = "rbshow", about = "Builds red-black trees and prints their shape.")]
struct Opt {
    #[arg(long, value_enum, default_value_t = Style::Indented)]
    /// How each dump of the tree is laid out.
    style: Style,

    #[arg(long, default_value_t = 3)]
    /// Spaces per level of depth in the indented layout.
    indent: usize,

    #[arg(short, long, action = clap::ArgAction::Count)]
    /// Log more to stderr. Repeat up to three times to see every rebalancing step.
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Insert 1..=COUNT, print the tree, delete the given keys, then print it again.
    Demo {
        #[arg(long, default_value_t = 20)]
        count: u32,

        #[arg(long = "delete", default_values_t = [20, 8])]
        /// Keys to delete after the first dump. May be repeated.
        deletes: Vec<u32>,

        #[arg(long)]
        /// Insert the keys in a random order instead of ascending.
        shuffle: bool,

        #[arg(long, requires = "shuffle")]
        /// Seed for --shuffle, to make the order repeatable.
        seed: Option<u64>,
    },
    /// Apply a script of insert, delete and print operations read from FILE or stdin.
    /// The tree is printed once more at the end.
    Run {
        #[arg(long)]
        /// Treat keys as strings rather than integers.
        strings: bool,

        file: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) -> Result<(), Error> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )])?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("rbshow: {e}");
        exit(1);
    }
}

fn run() -> Result<(), Error> {
    let opt = Opt::parse();
    init_logging(opt.verbose)?;

    let options = Options::default().style(opt.style).indent(opt.indent);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match opt.cmd {
        Command::Demo { count, deletes, shuffle, seed } => {
            let order = if shuffle { Order::Shuffled(seed) } else { Order::Ascending };
            demo(count, &deletes, order, &options, &mut out)?;
        }
        Command::Run { strings, file } => {
            let input: Box<dyn io::BufRead> = match file {
                Some(path) => Box::new(BufReader::new(File::open(path)?)),
                None => Box::new(io::stdin().lock()),
            };

            if strings {
                script::run::<String, _, _>(input, &options, &mut out)?;
            } else {
                script::run::<i64, _, _>(input, &options, &mut out)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Order {
    Ascending,
    // Seeded when repeatable output is wanted.
    Shuffled(Option<u64>),
}

fn demo<W: Write>(
    count: u32,
    deletes: &[u32],
    order: Order,
    options: &Options,
    out: &mut W,
) -> Result<RedBlackTree<u32>, Error> {
    let mut keys: Vec<_> = (1..=count).collect();

    if let Order::Shuffled(seed) = order {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        keys.shuffle(&mut rng);
        info!("Insertion order: {keys:?}");
    }

    let mut tree: RedBlackTree<_> = keys.into_iter().collect();
    writeln!(out, "After inserting 1..={count}:")?;
    render(&tree, options, out)?;

    for k in deletes {
        if tree.remove(k).is_none() {
            info!("{k} was not in the tree");
        }
    }

    let listed: Vec<_> = deletes.iter().map(u32::to_string).collect();
    writeln!(out, "After deleting {}:", listed.join(", "))?;
    render(&tree, options, out)?;

    Ok(tree)
}
