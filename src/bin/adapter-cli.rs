use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "adapter-cli")]
#[command(about = "Smoke-test CLI for a running billing adapter", long_about = None)]
struct Cli {
    /// Adapter base URL including the path prefix.
    #[arg(short, long, default_value = "http://localhost:8080/whmcs-api")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a login
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a client from key=value fields
    Register {
        /// Repeatable, e.g. --field firstname=Jane
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let (endpoint, body) = match cli.command {
        Commands::Login { email, password } => {
            let mut body = Map::new();
            body.insert("email".to_string(), Value::String(email));
            body.insert("password".to_string(), Value::String(password));
            ("login", body)
        }
        Commands::Register { fields } => {
            let body = fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect::<Map<String, Value>>();
            ("register", body)
        }
    };

    let res = client
        .post(format!("{}/{}", base, endpoint))
        .json(&body)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    eprintln!("HTTP {}", status);

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
