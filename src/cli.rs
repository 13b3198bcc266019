//! Command-line arguments shared by both jobs.

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct JobArgs {
    /// Comma separated list of namespaces to target (default: all namespaces)
    #[arg(long, value_name = "LIST")]
    pub namespaces: Option<String>,
}

impl JobArgs {
    pub fn namespaces(&self) -> Option<&str> {
        self.namespaces.as_deref()
    }
}
