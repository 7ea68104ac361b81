// Copyright 2025 eraflo
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

// Developer tasks for the satchel workspace
// Run with: cargo xtask <command>

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use commands::bundle::BundleArgs;
use helpers::print_error;

#[derive(Parser)]
#[command(name = "xtask", version, about = "Developer tasks for satchel")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack source directories into platform bundle files.
    Bundle(BundleArgs),
}

fn main() {
    let cli = Cli::parse();

    // Surfaces the log lines of the satchel crates the tasks call into.
    if let Err(e) = satchel_telemetry::logging::init("warn") {
        print_error(&format!("Logging unavailable: {e}"));
    }

    let result = match cli.command {
        Command::Bundle(args) => commands::bundle::run(&args),
    };

    if let Err(e) = result {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
