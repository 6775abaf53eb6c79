//! Command-line arguments for the gateway binary.

use std::path::PathBuf;

use clap::Parser;

use genmetr_core::error::Result;

use crate::config::{self, GatewayConfig};

pub const DEFAULT_CONFIG_PATH: &str = "genmetr.yaml";

#[derive(Debug, Parser)]
#[command(name = "genmetr-gateway", about = "HTTP request metrics gateway")]
pub struct Cli {
    /// YAML config file. Without it, `genmetr.yaml` is read if present and
    /// built-in defaults apply otherwise.
    pub config: Option<PathBuf>,
}

impl Cli {
    /// An explicit path must exist; the implicit default may be absent.
    pub fn load_config(&self) -> Result<GatewayConfig> {
        match &self.config {
            Some(path) => config::load_from_file(path),
            None => config::load_or_default(DEFAULT_CONFIG_PATH),
        }
    }
}
