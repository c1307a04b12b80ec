use anyhow::Result;
use clap::Parser;
use ins_content_pipeline::orchestrator::{App, Command};
use ins_content_pipeline::utils::logging;
use ins_content_pipeline::Config;

/// 内容流水线客户端
#[derive(Parser)]
#[command(name = "ins_content_pipeline", version, about = "社媒内容流水线客户端")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config.api_base_url);

    // 初始化并运行应用
    App::initialize(config).run(cli.command).await?;

    Ok(())
}
