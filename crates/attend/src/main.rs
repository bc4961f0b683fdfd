mod config;
mod discord;
mod sheets;
mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use attend_core::LoginService;
use clap::Parser;
use tracing::info;

use crate::{
    config::{Config, open_config, write_default_config},
    sheets::{ServiceAccountKey, SheetAttendanceLog, SheetProfiles, SheetSettings, SheetsClient},
    version::{long_version, short_version},
};

#[derive(Parser)]
#[command(version = short_version())]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.init {
        write_default_config(&args.config)?;
        info!(path = ?args.config, "Created default configuration");
        return Ok(());
    }

    info!(version = long_version(), "attend version");

    let config = open_config(&args.config).context("Failed to load configuration")?;
    let key = ServiceAccountKey::from_file(&config.sheets.credentials)
        .context("Failed to load service account credentials")?;
    info!(
        spreadsheet = %config.sheets.spreadsheet_id,
        client_email = %key.client_email,
        timezone = %config.attendance.timezone,
        timeout = %humantime::format_duration(config.sheets.timeout),
        "Configuration loaded"
    );

    let client = SheetsClient::new(&config.sheets.spreadsheet_id, key, config.sheets.timeout)
        .context("Failed to create Sheets client")?;
    let service = Arc::new(login_service(&config, Arc::new(client)));

    discord::run(&config, service).await
}

/// シートごとのストアを組み立て、ログイン処理に渡す。
fn login_service(config: &Config, client: Arc<SheetsClient>) -> LoginService {
    let sheets = &config.sheets;
    LoginService::new(
        Arc::new(SheetSettings::new(client.clone(), &sheets.settings_sheet)),
        Arc::new(SheetAttendanceLog::new(
            client.clone(),
            &sheets.log_sheet,
            config.log_schema(),
        )),
        Arc::new(SheetProfiles::new(client, &sheets.profile_sheet)),
        config.login_options(),
    )
}
