use std::process;

use folio::{
    application::{context::ApplicationContext, error::AppError},
    config::{self, DumpArgs, DumpKind},
    infra::{
        error::InfraError,
        http::{self, AdminState, HttpState},
        telemetry,
    },
};
use serde_json::Value;
use tokio::try_join;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Dump(args) => run_dump(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let app = ApplicationContext::build(&settings).await?;

    let http_state = HttpState {
        content: app.content.clone(),
        catalog: app.catalog,
    };
    let admin_state = AdminState {
        content: app.content,
    };

    serve_http(&settings, http_state, admin_state).await
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_router(http_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "folio::serve",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        "Listening"
    );

    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    try_join!(public_server, admin_server)
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target = "folio::serve", error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn run_dump(settings: config::Settings, args: DumpArgs) -> Result<(), AppError> {
    let app = ApplicationContext::build(&settings).await?;
    let content = &app.content;
    let catalog = &app.catalog;

    let output = match (args.kind, args.slug, args.id) {
        (DumpKind::Blog, None, None) => to_json(if content.is_blog_configured() {
            content.get_all_blog_previews().await
        } else {
            catalog.blog_previews()
        })?,
        (DumpKind::Blog, Some(slug), None) => {
            let body = if content.is_blog_configured() {
                content.get_blog_body_by_slug(&slug).await?
            } else {
                catalog.blog_body_by_slug(&slug)
            };
            to_json(body.ok_or_else(|| AppError::not_found(format!("blog post `{slug}`")))?)?
        }
        (DumpKind::Projects, None, None) => to_json(if content.is_projects_configured() {
            content.get_all_project_previews().await
        } else {
            catalog.project_previews()
        })?,
        (DumpKind::Projects, None, Some(id)) => {
            let body = if content.is_projects_configured() {
                content.get_project_body_by_id(&id).await?
            } else {
                catalog.project_body_by_id(&id)
            };
            to_json(body.ok_or_else(|| AppError::not_found(format!("project `{id}`")))?)?
        }
        (DumpKind::Blog, _, Some(_)) => {
            return Err(AppError::unexpected("blog entries are selected with --slug"));
        }
        (DumpKind::Projects, Some(_), _) => {
            return Err(AppError::unexpected("projects are selected with --id"));
        }
    };

    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn to_json(value: impl serde::Serialize) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|err| AppError::unexpected(format!("failed to serialize output: {err}")))
}
