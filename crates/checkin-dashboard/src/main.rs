//! Command-line view of guard check-in records.
//!
//! Runs one pipeline cycle for the given filters and prints the dashboard
//! view as JSON on stdout.

use std::process::ExitCode;

use checkin_api::CheckinClient;
use checkin_monitor::{
    CheckInStatus, DashboardController, DateRange, FetchOrchestrator, FilterState, MonitorConfig,
    PaginationState, RequestCache, SortOrder,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "checkin-dashboard")]
#[command(about = "Show guard check-in records, geofence anomalies and compliance statistics")]
struct Args {
    /// Status filter: all, success, failed or pending
    #[arg(long, default_value = "all")]
    status: String,

    /// Only records of this guard
    #[arg(long)]
    guard: Option<String>,

    /// Only records at this site
    #[arg(long)]
    site: Option<String>,

    /// Date window: today, last-7-days, last-30-days or all-time
    #[arg(long, default_value = "today")]
    range: String,

    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Rows per page (defaults to CHECKIN_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<u32>,

    /// Field to sort by
    #[arg(long, default_value = "checkInTime")]
    sort_by: String,

    /// Sort ascending instead of descending
    #[arg(long)]
    asc: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn filter(&self) -> Result<FilterState, String> {
        let status = match self.status.trim().to_lowercase().as_str() {
            "all" => None,
            other => Some(
                CheckInStatus::parse_filter(other)
                    .ok_or_else(|| format!("unknown status filter: {}", self.status))?,
            ),
        };
        let date_range = DateRange::parse(&self.range)
            .ok_or_else(|| format!("unknown date range: {}", self.range))?;

        Ok(FilterState {
            status,
            guard_id: self.guard.clone(),
            site_id: self.site.clone(),
            date_range,
        })
    }

    fn pagination(&self, default_page_size: u32) -> PaginationState {
        PaginationState {
            page_index: self.page.saturating_sub(1),
            page_size: self.page_size.filter(|&n| n > 0).unwrap_or(default_page_size),
            sort_by: self.sort_by.clone(),
            sort_order: if self.asc { SortOrder::Asc } else { SortOrder::Desc },
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("checkin_monitor=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = MonitorConfig::from_env()?;
    let filter = args.filter()?;
    let pagination = args.pagination(config.page_size);

    info!(url = %config.api_url, range = filter.date_range.as_str(), "Loading check-in records");

    let client = CheckinClient::new(config.api_config())?;
    let orchestrator =
        FetchOrchestrator::with_cache(Arc::new(client), Arc::new(RequestCache::new(config.cache_ttl)));
    let controller =
        DashboardController::with_settings(orchestrator, config.debounce, config.default_radius_meters);

    let view = controller.refresh(filter, pagination).await;

    if let Some(banner) = view.disclosure() {
        warn!("{}", banner);
    }
    if view.distance_anomalies > 0 {
        warn!(
            "{} check-ins outside their site's allowed radius",
            view.distance_anomalies
        );
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{}", output);

    Ok(if view.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
