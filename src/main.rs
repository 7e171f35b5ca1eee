//! Bookstore Gateway CLI
//!
//! 通过请求网关向后端发送一次请求，并打印解包后的负载:
//!
//! ```text
//! bookstore-gateway get /v2/books -p page=0 -p size=10
//! bookstore-gateway post /carts -d '{"items":[{"productId":5,"quantity":2}]}'
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use clap::{Parser, ValueEnum};

use bookstore_gateway::config::{load_config_from_path, print_config, LogConfig};
use bookstore_gateway::domain::{RequestBody, RequestOptions};
use bookstore_gateway::infrastructure::ReqwestTransport;
use bookstore_gateway::RequestGateway;

#[derive(Parser, Debug)]
#[command(name = "bookstore-gateway")]
#[command(about = "Send a request to the bookstore backend through the request gateway")]
struct Cli {
    /// 配置文件路径（默认搜索 config.toml / config.local.toml）
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(value_enum)]
    method: HttpMethod,

    /// 请求路径，例如 /v2/books
    path: String,

    /// 查询参数 key=value，可重复
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,

    /// JSON 请求体
    #[arg(short = 'd', long = "data")]
    data: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},bookstore_gateway={}", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn parse_params(raw: &[String]) -> anyhow::Result<RequestOptions> {
    raw.iter().try_fold(RequestOptions::new(), |options, pair| {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid param '{}', expected key=value", pair))?;
        Ok(options.param(key, value))
    })
}

/// `-d` 只能用于带请求体的方法
fn request_body(method: HttpMethod, data: Option<&str>) -> anyhow::Result<RequestBody> {
    match (method, data) {
        (HttpMethod::Get, Some(_)) => bail!("GET requests do not take a body, drop -d/--data"),
        (_, Some(data)) => Ok(RequestBody::Json(serde_json::from_str(data)?)),
        (_, None) => Ok(RequestBody::Empty),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);
    print_config(&config);

    let transport = Arc::new(ReqwestTransport::new(config.transport_config())?);
    let gateway = RequestGateway::new(transport, config.gateway_config());

    let options = parse_params(&cli.params)?;
    let body = request_body(cli.method, cli.data.as_deref())?;

    let result = match cli.method {
        HttpMethod::Get => gateway.get(&cli.path, options).await,
        HttpMethod::Post => gateway.post(&cli.path, body, options).await,
        HttpMethod::Put => gateway.put(&cli.path, body, options).await,
        HttpMethod::Delete => gateway.delete(&cli.path, body, options).await,
    };

    match result {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                kind = ?err.kind(),
                status = ?err.http_status().map(|s| s.as_u16()),
                code = ?err.code(),
                "Request failed"
            );
            if err.must_reauthenticate() {
                tracing::warn!("Session expired, please log in again");
            }
            bail!("{} (code: {})", err.message(), err.code().unwrap_or("-"))
        }
    }
}
