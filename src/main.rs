//! Contract router demo server.
//!
//! Serves a small read-only items catalogue through a contract, with an
//! inventory route that calls a simulated upstream and maps its failures to
//! standard responses.
//!
//! ```text
//! GET /{base}/items?limit=&offset=     list items
//! GET /{base}/items/{id}               one item
//! GET /{base}/items/{id}/history       price history
//! GET /{base}/inventory/{id}           stock level from the warehouse upstream
//! GET /{base}{description_path}        contract description
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use contract_router::config::{apply_bind_override, load_config, AppConfig};
use contract_router::contract::{
    ApiKeySecurity, ContractRoute, ContractRoutingHandler, JsonErrorRenderer, RouteMeta,
    RouteSpec,
};
use contract_router::filter::{client, server};
use contract_router::http::{response, HttpHandler, HttpServer};
use contract_router::lens::{Header, Path, Query};
use contract_router::lifecycle::{shutdown_on_ctrl_c, Shutdown};
use contract_router::observability::init_logging;

#[derive(Parser, Debug)]
#[command(name = "contract-router", version, about = "Contract router demo server")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Require this value in the `x-api-key` header.
    #[arg(long, env = "CONTRACT_API_KEY")]
    api_key: Option<String>,
}

struct Item {
    id: i64,
    name: &'static str,
    prices: &'static [u32],
    stock: Option<u32>,
}

const CATALOGUE: &[Item] = &[
    Item { id: 1, name: "kettle", prices: &[2500, 2300], stock: Some(12) },
    Item { id: 2, name: "toaster", prices: &[3100], stock: Some(0) },
    Item { id: 3, name: "blender", prices: &[5600, 5200, 4900], stock: None },
];

fn find(id: i64) -> Option<&'static Item> {
    CATALOGUE.iter().find(|item| item.id == id)
}

fn list_items() -> ContractRoute {
    let limit = Query::int().defaulted("limit", 10);
    let offset = Query::int().defaulted("offset", 0);
    RouteSpec::new("/items")
        .with_meta(
            RouteMeta::new()
                .summary("List items")
                .tag("items")
                .param(limit.clone())
                .param(offset.clone()),
        )
        .bind_handler(
            Method::GET,
            HttpHandler::new(move |request| {
                let limit = limit.extract(&request);
                let offset = offset.extract(&request);
                async move {
                    let (limit, offset) = (limit?, offset?);
                    let items: Vec<_> = CATALOGUE
                        .iter()
                        .skip(offset.max(0) as usize)
                        .take(limit.max(0) as usize)
                        .map(|item| json!({ "id": item.id, "name": item.name }))
                        .collect();
                    Ok(response::json(StatusCode::OK, &json!(items)))
                }
            }),
        )
}

fn get_item() -> ContractRoute {
    let id = Path::int().of("id").with_description("item id");
    RouteSpec::new("/items")
        .path(id.clone())
        .with_meta(RouteMeta::new().summary("Get one item").tag("items"))
        .bind(Method::GET, move |parts| {
            let item = parts.get(&id).and_then(find);
            HttpHandler::new(move |_| async move {
                Ok(match item {
                    Some(item) => response::json(
                        StatusCode::OK,
                        &json!({ "id": item.id, "name": item.name, "price": item.prices.last() }),
                    ),
                    None => response::empty(StatusCode::NOT_FOUND),
                })
            })
        })
}

fn item_history() -> ContractRoute {
    let id = Path::int().of("id");
    RouteSpec::new("/items")
        .path(id.clone())
        .fixed("history")
        .with_meta(RouteMeta::new().summary("Price history").tag("items").tag("audit"))
        .bind(Method::GET, move |parts| {
            let item = parts.get(&id).and_then(find);
            HttpHandler::new(move |_| async move {
                Ok(match item {
                    Some(item) => response::json(StatusCode::OK, &json!(item.prices)),
                    None => response::empty(StatusCode::NOT_FOUND),
                })
            })
        })
}

/// Stand-in for a remote warehouse service.
fn warehouse(id: i64) -> HttpHandler {
    HttpHandler::new(move |_| async move {
        Ok(match find(id) {
            Some(Item { stock: Some(stock), .. }) => {
                response::json(StatusCode::OK, &json!({ "stock": stock }))
            }
            Some(_) => response::text(StatusCode::GATEWAY_TIMEOUT, "warehouse timed out"),
            None => response::text(StatusCode::NOT_FOUND, "unknown item"),
        })
    })
}

fn inventory() -> ContractRoute {
    let id = Path::int().of("id");
    RouteSpec::new("/inventory")
        .path(id.clone())
        .with_meta(RouteMeta::new().summary("Stock level").tag("inventory"))
        .bind(Method::GET, move |parts| {
            let upstream = client::handle_upstream_request_failed()
                .apply(warehouse(parts.get(&id).unwrap_or_default()));
            server::handle_upstream_request_failed().apply(upstream)
        })
}

fn build_contract(config: &AppConfig, api_key: Option<String>) -> ContractRoutingHandler {
    let contract = ContractRoutingHandler::from_config(&config.contract)
        .with_renderer(JsonErrorRenderer)
        .with_routes([list_items(), get_item(), item_history(), inventory()]);
    match api_key {
        Some(expected) => contract.with_security(
            ApiKeySecurity::new(Header::string().required("x-api-key"), move |key: &String| {
                *key == expected
            })
            .skip_pre_flight(),
        ),
        None => contract,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    let config = apply_bind_override(config, cli.bind)?;

    init_logging(&config.observability)?;
    tracing::info!("contract-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_path = %config.contract.base_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let contract = build_contract(&config, cli.api_key);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()));

    let server = HttpServer::new(config, contract);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
