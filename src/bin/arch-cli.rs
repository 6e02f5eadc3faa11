use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use arch_dispatch::binding::{http_handler, ReqwestTransport, ServiceEndpoint};
use arch_dispatch::demo::HelloWorld;
use arch_dispatch::function::InvocationContext;

#[derive(Parser)]
#[command(name = "arch-cli")]
#[command(about = "Call routes of a running arch-dispatch server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a route by name; arguments are parsed as JSON, falling back to strings
    Call {
        container: String,
        route: String,
        args: Vec<String>,
    },
    /// List the routes of a container
    Routes {
        container: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let app = HelloWorld::new()?;

    match cli.command {
        Commands::Call { container, route, args } => {
            let container = app
                .container(&container)
                .ok_or_else(|| format!("Unknown container '{}'", container))?;
            let endpoint = ServiceEndpoint::from_base_url(cli.url)?;
            let call = http_handler(&endpoint, container, &route, Arc::new(ReqwestTransport::new()))?;

            let args: Vec<Value> = args
                .into_iter()
                .map(|a| serde_json::from_str(&a).unwrap_or(Value::String(a)))
                .collect();

            match call(args, InvocationContext::default()).await {
                Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Routes { container } => {
            let container = app
                .container(&container)
                .ok_or_else(|| format!("Unknown container '{}'", container))?;
            for name in container.list_routes() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
