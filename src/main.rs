use anyhow::Result;
use iris_batch::utils::logging;
use iris_batch::{App, AppResult, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    if let Err(e) = run().await {
        logging::log_failure(&e);
        return Err(e.into());
    }

    Ok(())
}

async fn run() -> AppResult<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
