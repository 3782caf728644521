use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sms-expense-relay")]
#[command(about = "Turns bank SMS webhooks into Splitwise expenses")]
pub struct CliArgs {
    #[arg(long, help = "Optional TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Listening port (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, default_value = ".env", help = "dotenv file loaded before reading the environment")]
    pub env_file: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}
