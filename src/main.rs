// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use ebs_csi_stack::cli::{commands::Commands, CliArgs};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr so rendered documents on stdout stay machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    match args.command {
        Commands::Preview(cmd) => cmd.execute().await,
        Commands::Render(cmd) => cmd.execute().await,
        Commands::TrustPolicy(cmd) => cmd.execute().await,
        Commands::PermissionPolicy(cmd) => cmd.execute().await,
        Commands::Status(cmd) => cmd.execute().await,
    }
}
