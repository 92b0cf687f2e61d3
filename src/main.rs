use clap::{Parser, ValueEnum};
use dbviz::config::{DEFAULT_CONFIG_FILE, DEFAULT_SECTION};
use dbviz::core::db::schema;
use dbviz::schema_map::{self, RelationGraph};
use dbviz::{DatabaseHandler, Result};
use std::path::PathBuf;
use tracing::info;

/// Graphviz layout engine used when the graph file is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    Dot,
    Neato,
    Fdp,
    Sfdp,
    Circo,
    Twopi,
}

impl Layout {
    fn as_engine(self) -> &'static str {
        match self {
            Layout::Dot => "dot",
            Layout::Neato => "neato",
            Layout::Fdp => "fdp",
            Layout::Sfdp => "sfdp",
            Layout::Circo => "circo",
            Layout::Twopi => "twopi",
        }
    }
}

/// Renders the foreign-key relationships of a PostgreSQL database as a
/// Graphviz graph.
#[derive(Debug, Parser)]
#[command(name = "dbviz", version)]
struct Cli {
    /// Configuration section describing the database to inspect
    #[arg(short = 's', long = "db_spec", default_value = DEFAULT_SECTION)]
    db_spec: String,

    /// Configuration file holding the connection sections
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory where the graph file is written
    #[arg(short = 'p', long = "path", default_value = ".")]
    path: PathBuf,

    /// Layout engine for the generated graph
    #[arg(short = 'l', long = "layout", value_enum, default_value_t = Layout::Circo)]
    layout: Layout,

    /// Also print the relationship map to the terminal
    #[arg(long)]
    show: bool,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("dbviz: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut handler = DatabaseHandler::new(cli.config, cli.db_spec);
    let relationships = schema::fetch_relationships(&mut handler)?;
    handler.rollback_and_close()?;
    info!(
        relationships = relationships.len(),
        section = handler.section(),
        "fetched foreign-key relationships"
    );

    let graph = RelationGraph::from_relationships(&relationships);
    let dot = schema_map::render_dot(&graph, cli.layout.as_engine());
    let target = cli.path.join("graph.dot");
    std::fs::write(&target, dot)?;
    println!("Wrote relationship graph to {}", target.display());

    if cli.show {
        print!("{}", schema_map::render_text(&graph));
    }

    Ok(())
}
