use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use inquire::error::InquireResult;
use tracing_subscriber::EnvFilter;

mod app;
mod bookmarks;
mod cli;
mod config;
mod curius;
mod semantic;
#[cfg(test)]
mod tests;
mod web;

use app::Indexer;
use config::Config;
use curius::CuriusClient;
use semantic::{embeddings, BookmarkHit, IndexStore, SemanticSearchService};

/// Store loaded from disk plus the configured embedder.
///
/// An unreadable snapshot is fatal unless the caller is about to rebuild.
fn build_service(config: &Config, rebuild: bool) -> anyhow::Result<SemanticSearchService> {
    let store = Arc::new(IndexStore::in_dir(config.data_dir()));
    if let Err(err) = store.load() {
        if !rebuild {
            return Err(anyhow::Error::new(err).context(format!(
                "could not load {} (rerun with --reindex to rebuild it)",
                store.storage().path().display()
            )));
        }
        log::warn!("could not load existing index, rebuilding: {err}");
    }

    let embedder = embeddings::from_config(&config.embedding, config.data_dir())
        .context("failed to initialize embedding provider")?;
    log::info!("using embedder {}", embedder.name());

    Ok(SemanticSearchService::new(store, embedder))
}

fn build_indexer(config: &Config, service: SemanticSearchService) -> anyhow::Result<Indexer> {
    let source = CuriusClient::new(&config.curius_user_id)?;
    Ok(Indexer::new(service, Arc::new(source)))
}

fn print_hits(results: Vec<semantic::SearchResult>) -> anyhow::Result<()> {
    let hits: Vec<BookmarkHit> = results.into_iter().map(BookmarkHit::from).collect();
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();
    let config = Config::load_with(&args.data_dir)?;

    match args.command {
        cli::Command::Serve { reindex } => {
            if config.curius_user_id.trim().is_empty() {
                bail!("curius_user_id is required. Set it in config.yaml or CURIUS_USER_ID.");
            }

            let indexer = Arc::new(build_indexer(&config, build_service(&config, reindex)?)?);

            let report = if reindex {
                indexer.rebuild()
            } else {
                indexer.run()
            };
            match report {
                Ok(report) => log::info!("initial index: {report:?}"),
                Err(err) => log::error!("initial index failed: {err}"),
            }

            // main keeps the last handle: the blocking http clients inside
            // must not be dropped on the runtime
            web::start_daemon(
                indexer.clone(),
                config.server.port,
                config.server.static_dir.clone(),
                config.reindex_interval(),
            )?;
            log::info!("goodbye");
            Ok(())
        }

        cli::Command::Index { reindex, yes } => {
            let indexer = build_indexer(&config, build_service(&config, reindex)?)?;

            if reindex && !yes && !indexer.service().store().is_empty() {
                match inquire::prompt_confirmation(format!(
                    "This drops all {} embedded bookmarks and embeds them again. Continue?",
                    indexer.service().store().count()
                )) {
                    InquireResult::Ok(true) => {}
                    InquireResult::Ok(false) => return Ok(()),
                    InquireResult::Err(err) => bail!("An error occurred: {}", err),
                }
            }

            let report = if reindex {
                indexer.rebuild()?
            } else {
                indexer.run()?
            };

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        cli::Command::Search { query, limit } => {
            if query.trim().is_empty() {
                bail!("query must not be empty");
            }

            let service = build_service(&config, false)?;
            print_hits(service.search(&query, semantic::clamp_limit(limit))?)
        }

        cli::Command::Similar { id, limit } => {
            let service = build_service(&config, false)?;
            print_hits(service.find_similar(id, semantic::clamp_limit(limit))?)
        }

        cli::Command::Status {} => {
            let service = build_service(&config, false)?;
            println!("{}", serde_json::to_string_pretty(&service.status())?);
            Ok(())
        }
    }
}
