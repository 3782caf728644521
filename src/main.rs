use clap::Parser;
use sms_expense_relay::config::{self, EnvFile};
use sms_expense_relay::utils::{logger, validation::Validate};
use sms_expense_relay::{server, AppConfig, CliArgs, SplitwiseClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // .env 不存在時直接使用目前的環境變數
    let env_file = config::load_env_file(&args.env_file);

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_server_logger(args.verbose);
    }

    tracing::info!("Starting sms-expense-relay");
    match &env_file {
        EnvFile::Loaded => tracing::debug!("Loaded environment from {}", args.env_file.display()),
        EnvFile::Missing => {}
        EnvFile::Invalid(reason) => tracing::warn!(
            "Environment file {} could not be parsed: {}",
            args.env_file.display(),
            reason
        ),
    }

    let config = match AppConfig::load(args.config.as_deref()).and_then(|config| {
        let config = config.with_port(args.port);
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Posting expenses to group {} via {}",
        config.default_group_id,
        config.api_base_url
    );

    let client = SplitwiseClient::new(config.as_ref(), config.credentials.api_key.clone())?;
    let app = server::build_app(client, Arc::clone(&config));

    server::serve(app, config.port).await
}
