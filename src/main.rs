//! Course Assistant - command-line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use course_assistant::{init_logging, load_catalog, ConfigService, CourseAssistant};
use course_assistant_tools::course_tools;

/// Ask questions about course materials
#[derive(Parser)]
#[command(name = "course-assistant")]
#[command(about = "Answer questions about course materials", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.course-assistant/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one question
    Ask {
        /// The question
        question: String,

        /// Course catalog (JSON)
        #[arg(long)]
        catalog: PathBuf,

        /// Earlier conversation to answer in the context of
        #[arg(long)]
        history: Option<String>,
    },

    /// Print the tool definitions offered to the model
    Tools {
        /// Course catalog (JSON)
        #[arg(long)]
        catalog: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("Failed to load configuration")?;
    let config = config_service.get_config_clone();

    match cli.command {
        Commands::Ask {
            question,
            catalog,
            history,
        } => {
            let store = load_catalog(&catalog, config.max_results)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            let assistant = CourseAssistant::from_config(&config, Arc::new(store))
                .context("Failed to start course assistant")?;

            let answer = assistant
                .answer_query(&question, history.as_deref())
                .await
                .context("Query failed")?;

            println!("{}", answer.answer);
            if !answer.sources.is_empty() {
                println!();
                println!("Sources:");
                for (i, source) in answer.sources.iter().enumerate() {
                    match &source.url {
                        Some(url) => println!("  {}. {} <{}>", i + 1, source.text, url),
                        None => println!("  {}. {}", i + 1, source.text),
                    }
                }
            }
        }
        Commands::Tools { catalog } => {
            let store = load_catalog(&catalog, config.max_results)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            let definitions = course_tools(Arc::new(store)).tool_definitions();
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
    }

    Ok(())
}
