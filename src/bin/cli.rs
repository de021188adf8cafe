use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use learn2ux::api::ContentClient;
use learn2ux::lang::Lang;
use learn2ux::server::app::run_server;
use learn2ux::settings::Settings;
use learn2ux::telemetry::init_tracing;
use learn2ux::transfer::{export_to, import_from};
use secrecy::SecretString;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the content service, overrides the configured one
    #[clap(long, env = "LEARN2UX_API_BASE_URL")]
    api: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site
    Serve,
    /// List categories
    Categories {
        #[clap(long, default_value = "en")]
        lang: Lang,
    },
    /// List questions, optionally of one category
    Questions {
        #[clap(long)]
        category: Option<String>,
        #[clap(long, default_value = "en")]
        lang: Lang,
    },
    /// Export all content to csv files in a directory
    Export { path: PathBuf },
    /// Create the content of an export through the admin API
    Import {
        path: PathBuf,
        /// Admin bearer token
        #[clap(long, env = "LEARN2UX_TOKEN", hide_env_values = true)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut settings = Settings::load().context("Cannot load settings")?;
    if let Some(api) = cli.api {
        settings.api_base_url = api;
    }
    let client = ContentClient::from_settings(&settings)?;
    match cli.command {
        Commands::Serve => run_server(settings).await?,
        Commands::Categories { lang } => {
            for category in client.list_categories().await? {
                println!(
                    "{}\t{}\t{}",
                    category.id,
                    category.question_number,
                    category.title(lang)
                );
            }
        }
        Commands::Questions { category, lang } => {
            let questions = match category {
                Some(id) => client.questions_by_category(&id, None).await?,
                None => client.list_questions(None).await?,
            };
            for question in questions {
                println!("{}\t{}", question.id, question.question(lang));
            }
        }
        Commands::Export { path } => {
            let summary = export_to(&client, &path).await.context("Cannot export")?;
            println!(
                "exported {} categories and {} questions",
                summary.categories, summary.questions
            );
        }
        Commands::Import { path, token } => {
            let token = SecretString::from(token);
            let summary = import_from(&client, &token, &path)
                .await
                .context("Cannot import")?;
            println!(
                "imported {} categories and {} questions, skipped {}",
                summary.categories, summary.questions, summary.skipped
            );
        }
    }
    Ok(())
}
