use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Semantic search over your Curius bookmarks", long_about = None)]
pub struct Args {
    /// Directory holding config.yaml and index.json
    #[clap(long, global = true, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index new bookmarks, then start the web server.
    Serve {
        /// Discard existing embeddings and re-embed everything first.
        #[clap(long, default_value = "false")]
        reindex: bool,
    },
    /// Index new bookmarks and exit.
    Index {
        /// Discard existing embeddings and re-embed everything.
        #[clap(long, default_value = "false")]
        reindex: bool,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
    /// Search the index
    Search {
        query: String,

        /// Max number of results; 0 or less means 20
        #[clap(short, long, default_value = "0", allow_negative_numbers = true)]
        limit: i64,
    },
    /// Bookmarks similar to a stored one
    Similar {
        id: u64,

        /// Max number of results; 0 or less means 10
        #[clap(short, long, default_value = "0", allow_negative_numbers = true)]
        limit: i64,
    },
    /// Print index size, last update and provider health
    Status {},
}
