// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::analyze::analysis_response_schema;

/// Object detection and vision-chat relay
#[derive(Parser, Debug)]
#[command(name = "vision-relay")]
#[command(version)]
#[command(about = "Object detection and generative vision-chat HTTP services", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve(serve::ServeArgs),

    /// Print the flattened AnalysisResult schema sent as responseSchema
    FlattenSchema,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::FlattenSchema => {
            let schema = analysis_response_schema()?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}
