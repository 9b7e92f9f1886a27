use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use function_router::RouterConfig;
use function_router_aws::AwsFunctionRouter;

mod items;

#[derive(Debug, Parser)]
struct Args {
    /// Optional router config (YAML).
    #[arg(long, env = "ROUTER_CONFIG")]
    config: Option<PathBuf>,
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<RouterConfig> {
    let Some(path) = path else {
        return Ok(RouterConfig::default());
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading router config {}", path.display()))?;
    RouterConfig::from_yaml_bytes(&bytes)
        .with_context(|| format!("parsing router config {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref()).await?;
    tracing::info!(config = ?config, "starting");

    let mut router = AwsFunctionRouter::with_config(config);
    items::register(router.routes_mut(), items::ItemStore::default())?;

    function_router_aws::run(router).await
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[tokio::test]
    async fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).await.unwrap(), RouterConfig::default());
    }

    #[tokio::test]
    async fn config_errors_keep_their_source_chain() {
        let err = load_config(Some(Path::new("/nonexistent/router.yaml")))
            .await
            .unwrap_err();
        let err: lambda_runtime::Error = err.into();

        assert!(err.to_string().starts_with("reading router config"));
        let source = err.source().expect("io error kept as source");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }
}
