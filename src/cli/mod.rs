// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// SQLDrill Admin - SQL-practice platform administration CLI
///
/// Manage companies, domains, questions, topics, practice databases and tables,
/// users and submissions through the platform's REST API.
#[derive(Parser, Debug)]
#[command(name = "sqldrill-admin")]
#[command(author = "SQLDrill Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Administration CLI for the SQL-practice platform")]
#[command(long_about = "SQLDrill Admin - SQL-practice platform administration CLI

Manage the platform's content and accounts from the command line.

SQLDrill Admin helps you:
  • List, create, update and delete platform entities
  • Check CREATE TABLE / INSERT INTO statements before uploading a table
  • Attach logos, schema diagrams and videos as multipart uploads
  • Export users and submissions as CSV

Entity kinds: companies, domains, questions, topics, tables, databases, submissions, users")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Create a config file:          sqldrill-admin init --base-url https://api.example.com
  2. Provide a token:               export SQLDRILL_ADMIN_TOKEN=...
  3. Browse entities:               sqldrill-admin list questions --filter difficulty=easy
  4. Check a table definition:      sqldrill-admin validate-sql --create orders.sql --insert seed.sql

For detailed help on each command, use: sqldrill-admin <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a configuration file for the admin CLI
    ///
    /// EXAMPLES:
    ///   # Point at a local backend
    ///   sqldrill-admin init
    ///
    ///   # Point at a deployed backend, overwriting an existing config
    ///   sqldrill-admin init --base-url https://api.example.com --force
    Init {
        /// Base URL of the platform API
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Check that a CREATE TABLE and an INSERT INTO statement agree
    ///
    /// Compares the table name and column list of both statements without
    /// contacting the API.
    ///
    /// EXAMPLES:
    ///   sqldrill-admin validate-sql --create orders.sql --insert orders_seed.sql
    ValidateSql {
        /// File containing the CREATE TABLE statement
        #[arg(long, value_name = "FILE")]
        create: PathBuf,

        /// File containing the INSERT INTO statement
        #[arg(long, value_name = "FILE")]
        insert: Option<PathBuf>,
    },

    /// List entities
    ///
    /// EXAMPLES:
    ///   sqldrill-admin list companies
    ///   sqldrill-admin list questions --filter difficulty=hard --filter company_id=3
    ///   sqldrill-admin list users --sort email
    List {
        /// Entity kind (companies, domains, questions, topics, tables, databases, submissions, users)
        kind: String,

        /// Filter in the form name=value (repeatable)
        #[arg(short, long, value_name = "NAME=VALUE")]
        filter: Vec<String>,

        /// Sort the result by a field on the client
        #[arg(long, value_name = "FIELD")]
        sort: Option<String>,
    },

    /// Create an entity from a JSON file
    ///
    /// EXAMPLES:
    ///   sqldrill-admin create companies --data acme.json --attach logo=acme.png
    Create {
        /// Entity kind
        kind: String,

        /// JSON file with the entity attributes
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// File attachment in the form field=path (repeatable)
        #[arg(short, long, value_name = "FIELD=PATH")]
        attach: Vec<String>,
    },

    /// Update an entity from a JSON file
    Update {
        /// Entity kind
        kind: String,

        /// Entity id
        id: String,

        /// JSON file with the entity attributes
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// File attachment in the form field=path (repeatable)
        #[arg(short, long, value_name = "FIELD=PATH")]
        attach: Vec<String>,
    },

    /// Delete an entity
    Delete {
        /// Entity kind
        kind: String,

        /// Entity id
        id: String,
    },

    /// Export entities as CSV
    ///
    /// EXAMPLES:
    ///   sqldrill-admin export users --range 30 --field email --field created_at
    Export {
        /// Entity kind
        kind: String,

        /// Date range: 7, 30 or all
        #[arg(short, long, value_name = "RANGE", default_value = "all")]
        range: String,

        /// Field to include (repeatable)
        #[arg(long, value_name = "FIELD")]
        field: Vec<String>,

        /// Output file (defaults to <kind>_<range>_<timestamp>.csv)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
