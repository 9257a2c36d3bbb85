use anyhow::Result;
use clap::{Parser, Subcommand};
use embed_cli::embed::EmbedArgs;
use tracing::info;

#[derive(Parser)]
#[command(name = "embed-cli")]
#[command(about = "Embed a file of sentences into a binary vector file")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed input lines into fixed-width binary vectors
    Embed(EmbedArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Embed(args) => {
            // Configure logging level based on debug flag
            if args.debug {
                tracing_subscriber::fmt()
                    .with_max_level(tracing::Level::DEBUG)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_max_level(tracing::Level::WARN)
                    .init();
            }

            if args.debug {
                info!("Starting embed-cli embed");
                info!("Input: {:?}", args.input);
                info!("Output: {:?}", args.output);
                info!("Batch size: {}", args.batch_size);
            }

            match embed_cli::embed::run_embed_command(args) {
                Ok(_) => {
                    std::process::exit(0);
                }
                Err(e) => {
                    // Check error type for appropriate exit codes
                    let error_msg = e.to_string();
                    if error_msg.contains("does not exist")
                        || error_msg.contains("is not a file")
                        || error_msg.contains("is a directory")
                        || error_msg.contains("must be greater than 0")
                        || error_msg.contains("Batch size")
                    {
                        // Validation error - exit code 2
                        eprintln!("Error: {}", e);
                        std::process::exit(2);
                    } else if error_msg.contains("Failed to load model spec")
                        || error_msg.contains("Failed to load tokenizer")
                        || error_msg.contains("Failed to initialize")
                    {
                        // Model configuration error - exit code 3
                        eprintln!("Model Error: {}", e);
                        std::process::exit(3);
                    } else {
                        // General runtime error - exit code 1
                        eprintln!("Runtime Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
    }
}
