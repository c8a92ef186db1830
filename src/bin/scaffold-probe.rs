use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tonic::transport::Channel;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

#[derive(Parser)]
#[command(name = "scaffold-probe")]
#[command(about = "Probe the endpoints of a running service-scaffold", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the metrics exposition
    Metrics {
        #[arg(short, long, default_value = "http://localhost:19090/metrics")]
        url: String,
    },
    /// Query grpc.health.v1 status
    Health {
        #[arg(short, long, default_value = "http://localhost:50051")]
        endpoint: String,

        /// Service name; empty checks overall server health
        #[arg(short, long, default_value = "")]
        service: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Metrics { url } => {
            let res = reqwest::get(&url).await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: metrics endpoint returned status {}", status);
                return Ok(ExitCode::FAILURE);
            }
            print!("{}", res.text().await?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health { endpoint, service } => {
            let channel = Channel::from_shared(endpoint)?.connect().await?;
            let mut client = HealthClient::new(channel);
            let response = client
                .check(HealthCheckRequest {
                    service: service.clone(),
                })
                .await?
                .into_inner();

            let status = ServingStatus::try_from(response.status).unwrap_or(ServingStatus::Unknown);
            let report = json!({
                "service": service,
                "status": status.as_str_name(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);

            if status == ServingStatus::Serving {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
