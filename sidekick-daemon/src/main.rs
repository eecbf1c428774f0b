use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;

use sidekick_core::config::SidekickConfig;
use sidekick_daemon::cli::DaemonCli;
use sidekick_daemon::logging;
use sidekick_daemon::runner::Runner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 설정 로드: 파일 → 환경변수 → CLI 플래그
    let mut config = match &cli.config {
        Some(path) => SidekickConfig::load(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?,
        None => {
            let mut config = SidekickConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!("sidekick-daemon starting");

    let runner = Runner::build_from_config(&config)?;
    let input = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = runner.run(input) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    runner.log_statistics();
    tracing::info!("sidekick-daemon shut down");
    Ok(())
}
