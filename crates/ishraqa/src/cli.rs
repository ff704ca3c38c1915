use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ishraqa")]
#[command(about = "Ishraqa - real-estate project search", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (same as ISHRAQA_DEBUG=true)
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "ishraqa.toml")]
        path: PathBuf,
    },
    /// Run one search and print the results
    Search {
        /// Free-text query (empty matches everything)
        #[arg(default_value = "")]
        query: String,
        /// Index identifier, `name` or `name:sort`
        #[arg(long)]
        index: Option<String>,
        /// Zero-based page number
        #[arg(long, default_value = "0")]
        page: usize,
        /// Results per page
        #[arg(long)]
        hits_per_page: Option<usize>,
        /// Sort key, e.g. `price:asc`
        #[arg(long)]
        sort: Option<String>,
        /// Facet filter `field:value`; commas make an OR-group, repeats are AND-ed
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Print the normalized page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the HTTP/WebSocket gateway server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}
