use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::openai::OpenAiChat;
use crate::infra::config::Config;
use crate::tools::analyze::ImageAnalyzer;

#[derive(Parser)]
#[command(name = "analyze-image-mcp")]
#[command(about = "MCP server that analyzes local images with a multimodal model")]
#[command(version)]
pub struct Cli {
    /// Run an admin command instead of serving MCP
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Health check a running HTTP server
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration without starting the service
    Config,
    /// Analyze one image and print the result as JSON
    Analyze {
        /// Absolute path of the image file
        image_path: String,
        /// Prompt for the analysis
        #[arg(short, long, default_value = "")]
        prompt: String,
    },
    /// Analyze two images together and print the result as JSON
    AnalyzePair {
        /// Absolute path of the first image file
        image_path1: String,
        /// Absolute path of the second image file
        image_path2: String,
        /// Prompt for the analysis
        #[arg(short, long, default_value = "")]
        prompt: String,
    },
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Analyze { image_path, prompt } => {
            report(analyze_once(&image_path, &prompt).await)
        }
        Commands::AnalyzePair {
            image_path1,
            image_path2,
            prompt,
        } => report(analyze_pair_once(&image_path1, &image_path2, &prompt).await),
    }
}

fn report(res: Result<String, Box<dyn std::error::Error>>) -> ExitCode {
    match res {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Analysis failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url.trim_end_matches('/')))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env_and_toml()?;
    cfg.validate()?;
    cfg.openai.require_api_key()?;
    Ok(())
}

fn analyzer_from_env() -> Result<ImageAnalyzer<OpenAiChat>, Box<dyn std::error::Error>> {
    let cfg = Config::from_env_and_toml()?;
    let chat = OpenAiChat::from_config(&cfg.openai)?;
    Ok(ImageAnalyzer::new(chat, cfg.openai.model))
}

async fn analyze_once(image_path: &str, prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    let out = analyzer_from_env()?.analyze_image(image_path, prompt).await?;
    Ok(serde_json::to_string_pretty(&out)?)
}

async fn analyze_pair_once(
    image_path1: &str,
    image_path2: &str,
    prompt: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let out = analyzer_from_env()?
        .analyze_two_images(image_path1, image_path2, prompt)
        .await?;
    Ok(serde_json::to_string_pretty(&out)?)
}
