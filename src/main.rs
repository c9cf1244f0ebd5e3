mod assets;
mod cli;
mod config;
mod db;
mod error;
mod journal;
mod models;
mod sampler;
mod sources;
mod streaks;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::repository::MetaRepo;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    debug!("Using database {:?}", db_path);
    let conn = db::open(&db_path)?;

    match cli.command {
        Some(Commands::Setup { reset }) => {
            handlers::handle_setup(&conn, &mut config, reset)?;
        }

        // Explicit subcommands, check setup first
        Some(cmd) => {
            ensure_setup(&conn, &mut config)?;
            match cmd {
                Commands::New {
                    content,
                    title,
                    mood,
                    category,
                    images,
                } => {
                    handlers::handle_new(
                        &conn,
                        &config,
                        &content,
                        title,
                        &mood,
                        category.as_deref(),
                        &images,
                    )?;
                }
                Commands::List { limit } => {
                    handlers::handle_list(&conn, &config, limit)?;
                }
                Commands::Show { id } => {
                    handlers::handle_show(&conn, &config, &id)?;
                }
                Commands::Edit {
                    id,
                    title,
                    content,
                    mood,
                    category,
                } => {
                    handlers::handle_edit(
                        &conn,
                        &id,
                        title,
                        content,
                        mood.as_deref(),
                        category.as_deref(),
                    )?;
                }
                Commands::Delete { id, yes } => {
                    handlers::handle_delete(&conn, &id, yes)?;
                }
                Commands::Streak => {
                    handlers::handle_streak(&conn, &config)?;
                }
                Commands::Prompt { count, tag } => {
                    handlers::handle_prompt(&conn, count, tag.as_deref())?;
                }
                Commands::Prompts { action } => {
                    handlers::handle_prompts(&conn, &action)?;
                }
                Commands::Categories { action } => {
                    handlers::handle_categories(&conn, &action)?;
                }
                Commands::Export { json } => {
                    handlers::handle_export(&conn, &config, json)?;
                }
                Commands::Setup { .. } => unreachable!(),
            }
        }

        // No subcommand → launch TUI
        None => {
            ensure_setup(&conn, &mut config)?;
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}

/// Check if setup has been done; if not, run the wizard automatically.
fn ensure_setup(conn: &Connection, config: &mut AppConfig) -> Result<()> {
    let done = MetaRepo::get(conn, "setup_done")?;
    if done.as_deref() != Some("1") {
        eprintln!("No configuration found. Running setup...");
        eprintln!();
        handlers::handle_setup(conn, config, false)?;
    }
    Ok(())
}
