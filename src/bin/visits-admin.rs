use anyhow::Result;
use clap::{Parser, Subcommand};
use captcha_visits::config::Config;
use captcha_visits::storage;
use captcha_visits::tracker::{fingerprint_parts, VisitorTracker};

#[derive(Parser)]
#[command(name = "visits-admin")]
#[command(about = "Visitor counter inspection CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the persisted visit counts
    Show,
    /// Print the fingerprint the server computes for a visitor
    Fingerprint {
        /// Client address (first X-Forwarded-For entry)
        #[arg(long, default_value = "unknown")]
        ip: String,
        /// User-Agent header value
        #[arg(long, default_value = "unknown")]
        user_agent: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show => {
            let config = Config::from_env()?;
            let store = storage::open_store(&config.storage);
            let tracker = VisitorTracker::new(store);

            let record = tracker.read().await;
            println!("Store:           {}", tracker.store().describe());
            println!("Total visits:    {}", record.total_visits);
            println!("Unique visitors: {}", record.unique_visitors.len());
            println!("Last updated:    {}", record.last_updated);
        }
        Commands::Fingerprint { ip, user_agent } => {
            println!("{}", fingerprint_parts(&ip, &user_agent));
        }
    }

    Ok(())
}
