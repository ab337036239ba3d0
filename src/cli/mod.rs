pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "repodrop")]
#[command(about = "Repodrop - password-protected repository sharing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the Repodrop server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Run database migrations
    Migrate,

    /// Import a repository into a new container
    Import {
        /// Repository locator, e.g. https://github.com/owner/repo
        url: String,

        /// Branch to import (defaults to the locator's branch or main)
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Show repository metadata without importing
    Info {
        /// Repository locator, e.g. https://github.com/owner/repo
        url: String,
    },
}
