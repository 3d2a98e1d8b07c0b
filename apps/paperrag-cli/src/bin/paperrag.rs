use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use paperrag_core::config::Config;
use paperrag_core::types::{ImageSpace, TextSpace};
use paperrag_embed::Encoders;
use paperrag_hybrid::{ModalityPipeline, MultimodalRetriever};
use paperrag_llm::GeminiClient;
use paperrag_rag::{AnswerRequest, AnswerResponse, ResearchService, SummarizeRequest};
use paperrag_vector::connect_index;

#[derive(Parser)]
#[command(name = "paperrag", about = "Ask questions about indexed research papers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question from the text and figure indexes
    Ask {
        query: String,
        #[arg(long)]
        top_k_text: Option<usize>,
        #[arg(long)]
        top_k_img: Option<usize>,
        /// Matches to print with the answer (at most 5 are returned)
        #[arg(long, default_value_t = 5)]
        show_matches: usize,
    },
    /// Structured summary of one paper
    Summarize {
        paper_id: String,
        #[arg(long)]
        top_k_text: Option<usize>,
        #[arg(long)]
        top_k_img: Option<usize>,
    },
}

async fn build_service(config: &Config) -> anyhow::Result<ResearchService> {
    let settings = config.settings()?;
    let encoders = Encoders::load(&settings.encoders)?;
    let text_index = connect_index::<TextSpace>(&settings.text_index).await?;
    let image_index = connect_index::<ImageSpace>(&settings.image_index).await?;
    let retriever = MultimodalRetriever::new(
        ModalityPipeline::new(encoders.text, text_index),
        ModalityPipeline::new(encoders.image, image_index),
        settings.retrieval,
    );
    let model = GeminiClient::new(&settings.llm)?;
    info!(model = %settings.llm.model, text_index = %settings.text_index.name, image_index = %settings.image_index.name, "pipeline ready");
    Ok(ResearchService::new(Arc::new(retriever), Arc::new(model)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let service = build_service(&config).await?;

    let output = match cli.command {
        Command::Ask { query, top_k_text, top_k_img, show_matches } => {
            let mut response = service.answer(AnswerRequest { query, top_k_text, top_k_img }).await;
            if let AnswerResponse::Success { matches, .. } = &mut response {
                matches.truncate(show_matches);
            }
            serde_json::to_string_pretty(&response)?
        }
        Command::Summarize { paper_id, top_k_text, top_k_img } => {
            let response = service.summarize(SummarizeRequest { paper_id, top_k_text, top_k_img }).await;
            serde_json::to_string_pretty(&response)?
        }
    };
    println!("{}", output);
    Ok(())
}
