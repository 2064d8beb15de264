//! orthodraw CLI: reads an edge list and prints an orthogonal box drawing.

use std::fs;
use std::io::{self, Read};
use std::process;
use std::time::Duration;

use clap::Parser;

use orthodraw::{draw, DrawParams, Graph};

/// Draw an undirected graph as an orthogonal box-drawing diagram.
#[derive(Parser, Debug)]
#[command(name = "orthodraw", version, about)]
struct Cli {
    /// Edge-list file (reads from stdin if not provided)
    input: Option<String>,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Write node labels inside their boxes
    #[arg(short = 'l', long = "labels")]
    labels: bool,

    /// Minimum columns of edge between two boxes side by side
    #[arg(long = "edge-width", default_value_t = 4)]
    edge_width: i64,

    /// Minimum rows of edge between two stacked boxes
    #[arg(long = "edge-height", default_value_t = 1)]
    edge_height: i64,

    /// Time limit for each optimization solve in milliseconds, 0 for none
    #[arg(long = "timeout-ms", default_value_t = 30_000)]
    timeout_ms: u64,

    /// Lay out components one after another on the main thread
    #[arg(long = "sequential")]
    sequential: bool,
}

impl Cli {
    fn params(&self) -> DrawParams {
        DrawParams {
            edge_width: self.edge_width,
            edge_height: self.edge_height,
            labels: self.labels,
            solve_timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
            parallel: !self.sequential,
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn main() {
    // Default: WARN for everything, INFO for orthodraw.
    // Override with RUST_LOG (e.g. RUST_LOG=orthodraw=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("orthodraw=info".parse().unwrap_or_default());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let text = if let Some(path) = &cli.input {
        fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("cannot read '{path}': {e}")))
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            fail(&format!("cannot read stdin: {e}"));
        }
        buf
    };

    let graph = Graph::parse(&text).unwrap_or_else(|e| fail(&e.to_string()));
    let drawing = draw(&graph, &cli.params()).unwrap_or_else(|e| fail(&e.to_string()));

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, drawing) {
                fail(&format!("cannot write '{path}': {e}"));
            }
        }
        None => print!("{drawing}"),
    }
}
