use anyhow::Result;
use clap::{CommandFactory, Parser};

use crate::cli::args::{Args, Commands, ScanArgs};
use crate::cli::commands::{run_code_command, run_url_command};
use crate::config::GuardianConfig;

pub struct RootCommand;

impl RootCommand {
    pub async fn execute() -> Result<()> {
        println!(
            r#"
        ╭───────────────╮
        │ ░░░░░░░░░░░░░ │
        │ ░▓▓▓▓▓▓▓▓▓▓▓░ │
        │ ░▓▓███████▓▓░ │
        ╲ ░▓▓███████▓▓░ ╱
         ╲ ░▓▓█████▓▓░ ╱
          ╲ ░▓▓███▓▓░ ╱
           ╲ ░▓▓█▓▓░ ╱
            ╲ ░▓▓▓░ ╱
             ╲░▓░╱
              ╲░╱
      C O D E   G U A R D I A N
              v{}
"#,
            env!("CARGO_PKG_VERSION")
        );

        let args = Args::parse();

        if args.generate_config {
            println!("{}", GuardianConfig::generate_default_config());
            return Ok(());
        }

        let scan_args = ScanArgs::from(&args);

        match args.command {
            Some(Commands::Code { input, language }) => {
                run_code_command(input, language, scan_args).await
            }
            Some(Commands::Url { url }) => run_url_command(url, scan_args).await,
            None => {
                Args::command().print_help()?;
                Ok(())
            }
        }
    }
}
