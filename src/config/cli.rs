use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

/// Command-line arguments for the Folio binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Folio portfolio content server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub notion: NotionOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public and admin HTTP listeners.
    Serve(Box<ServeArgs>),
    /// Fetch content once and print it as JSON.
    Dump(DumpArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct NotionOverrides {
    /// Notion integration token.
    #[arg(long = "notion-token", env = "NOTION_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Notion database holding blog posts.
    #[arg(long = "notion-blog-database", env = "NOTION_BLOG_DATABASE_ID", value_name = "ID")]
    pub blog_database_id: Option<String>,

    /// Notion database holding projects.
    #[arg(
        long = "notion-projects-database",
        env = "NOTION_PROJECTS_DATABASE_ID",
        value_name = "ID"
    )]
    pub projects_database_id: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the TTL of cached listings.
    #[arg(long = "cache-list-ttl-seconds", value_name = "SECONDS")]
    pub cache_list_ttl_seconds: Option<u64>,

    /// Override the TTL of cached detail entries.
    #[arg(long = "cache-detail-ttl-seconds", value_name = "SECONDS")]
    pub cache_detail_ttl_seconds: Option<u64>,

    /// JSON catalog served when Notion is not configured.
    #[arg(long = "content-fallback-path", value_name = "PATH")]
    pub content_fallback_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpKind {
    Blog,
    Projects,
}

#[derive(Debug, Args, Clone)]
pub struct DumpArgs {
    /// Which content type to fetch.
    #[arg(value_enum)]
    pub kind: DumpKind,

    /// Print a single blog post instead of the listing.
    #[arg(long, value_name = "SLUG", conflicts_with = "id")]
    pub slug: Option<String>,

    /// Print a single project instead of the listing.
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,
}
