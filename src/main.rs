use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;

use hubspot_bridge::api::{Bridge, HubspotClient, QueryRequest};
use hubspot_bridge::config::HubspotConfig;

#[derive(Parser)]
#[command(name = "hubspot-bridge")]
#[command(about = "Query HubSpot CRM objects through the bridge", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the records matching a query
    Count(RequestArgs),
    /// Retrieve the single record matching a query
    Retrieve(RequestArgs),
    /// Search for records, one page at a time
    Search(RequestArgs),
}

#[derive(Args)]
struct RequestArgs {
    /// Structure to query: Companies, Contacts, Tickets, or Adhoc
    #[arg(short, long)]
    structure: String,

    /// Qualification query, e.g. 'id=512' or '/objects/contacts?accessor=results'
    #[arg(short, long, default_value = "")]
    query: String,

    /// Field to include in the output, repeatable
    #[arg(short, long = "field")]
    fields: Vec<String>,

    /// Placeholder value as Name=value, repeatable
    #[arg(short, long = "parameter", value_parser = parse_pair)]
    parameters: Vec<(String, String)>,

    /// Metadata entry as name=value, e.g. page=<token> or order=name:DESC
    #[arg(short, long = "metadata", value_parser = parse_pair)]
    metadata: Vec<(String, String)>,
}

impl RequestArgs {
    fn into_request(self) -> QueryRequest {
        let mut request = QueryRequest::new(self.structure)
            .with_query(self.query)
            .with_fields(self.fields);
        for (name, value) in self.parameters {
            request = request.with_parameter(name, value);
        }
        for (name, value) in self.metadata {
            request = request.with_metadata(name, value);
        }
        request
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let config = HubspotConfig::from_env()?;
    let bridge = Bridge::new(HubspotClient::from_config(&config));
    info!("Starting hubspot-bridge");

    match cli.command {
        Commands::Count(args) => {
            let count = bridge.count(&args.into_request()).await?;
            println!("{}", count.value());
        }
        Commands::Retrieve(args) => {
            let record = bridge.retrieve(&args.into_request()).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Search(args) => {
            let list = bridge.search(&args.into_request()).await?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
    }

    Ok(())
}
