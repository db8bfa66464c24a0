use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use sqldrill_admin::adapters::credentials::provider_from_config;
use sqldrill_admin::adapters::http_client::ReqwestApiClient;
use sqldrill_admin::cli::command_context::CommandContext;
use sqldrill_admin::cli::commands::export::{ExportCommand, ExportCommandHandler};
use sqldrill_admin::cli::commands::init::{InitCommand, InitCommandHandler};
use sqldrill_admin::cli::commands::list::{ListCommand, ListCommandHandler};
use sqldrill_admin::cli::commands::mutate::{MutateCommand, MutateCommandHandler, Mutation};
use sqldrill_admin::cli::commands::validate_sql::{ValidateSqlCommand, ValidateSqlCommandHandler};
use sqldrill_admin::cli::{Cli, Commands};
use sqldrill_admin::core::entity::{EntityId, EntityKind};
use std::env;
use std::io::IsTerminal;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    if cli.no_color {
        color_control::set_override(false);
    }
    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create Tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// ログ出力を初期化する（RUST_LOG が優先）
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;
    let format = cli.format;

    match cli.command {
        Commands::Init { base_url, force } => {
            let handler = InitCommandHandler::new();
            let command = InitCommand {
                project_path,
                config_path: cli.config,
                base_url,
                force,
            };
            let path = handler.execute(&command)?;
            Ok(format!("Config file written to {}.", path.display()))
        }

        Commands::ValidateSql { create, insert } => {
            let handler = ValidateSqlCommandHandler::new();
            let command = ValidateSqlCommand {
                create_path: create,
                insert_path: insert,
                format,
            };
            handler.execute(&command)
        }

        Commands::List { kind, filter, sort } => {
            let context = CommandContext::load(project_path, cli.config, format)?;
            let stores = context.stores()?;
            let handler = ListCommandHandler::new();
            let command = ListCommand {
                kind: parse_kind(&kind)?,
                filters: filter,
                sort,
                format,
            };
            handler.execute(&stores, &command).await
        }

        Commands::Create { kind, data, attach } => {
            let context = CommandContext::load(project_path, cli.config, format)?;
            let command = MutateCommand {
                kind: parse_kind(&kind)?,
                mutation: Mutation::Create {
                    data: context.resolve_path(&data),
                    attachments: attach,
                },
                format,
            };
            MutateCommandHandler::new()
                .execute(&context.stores()?, &command)
                .await
        }

        Commands::Update {
            kind,
            id,
            data,
            attach,
        } => {
            let context = CommandContext::load(project_path, cli.config, format)?;
            let command = MutateCommand {
                kind: parse_kind(&kind)?,
                mutation: Mutation::Update {
                    id: parse_id(&id),
                    data: context.resolve_path(&data),
                    attachments: attach,
                },
                format,
            };
            MutateCommandHandler::new()
                .execute(&context.stores()?, &command)
                .await
        }

        Commands::Delete { kind, id } => {
            let context = CommandContext::load(project_path, cli.config, format)?;
            let command = MutateCommand {
                kind: parse_kind(&kind)?,
                mutation: Mutation::Delete { id: parse_id(&id) },
                format,
            };
            MutateCommandHandler::new()
                .execute(&context.stores()?, &command)
                .await
        }

        Commands::Export {
            kind,
            range,
            field,
            output,
        } => {
            let context = CommandContext::load(project_path, cli.config, format)?;
            let client = ReqwestApiClient::from_config(&context.config.api)
                .with_context(|| "Failed to initialize API client")?;
            let credentials = provider_from_config(&context.config.auth);
            let command = ExportCommand {
                kind: parse_kind(&kind)?,
                range: range.parse()?,
                fields: field,
                output: output.map(|path| context.resolve_path(&path)),
                show_progress: std::io::stderr().is_terminal(),
            };
            ExportCommandHandler::new()
                .execute(&context.config, Arc::new(client), credentials, &command)
                .await
        }
    }
}

/// エンティティ種別の文字列をEntityKind型に変換する
fn parse_kind(kind: &str) -> Result<EntityKind> {
    kind.parse::<EntityKind>()
}

/// ID文字列をEntityIdに変換する（数値として解釈できれば数値ID）
fn parse_id(id: &str) -> EntityId {
    match id.parse::<EntityId>() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}
