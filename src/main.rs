use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use airq_airkorea::{
    AirKoreaClient, AirQualityError, Coordinate, FixedLocation, LocationProvider,
};
use airq_core::{AppError, Config, ConfigError};
use airq_ui::services::{request_air_quality_fetch, AirQualityServiceMessage};
use airq_ui::{MainScreen, QueryOutcome, QueryPipeline, Surface, Widget};

#[derive(Parser, Debug)]
#[command(name = "airq")]
#[command(about = "Air quality at the nearest AirKorea monitoring station")]
struct Args {
    /// Latitude to query (overrides the configured location)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude to query (overrides the configured location)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Print only the widget line (emoji and label)
    #[arg(short, long)]
    widget: bool,

    /// Path to an alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    airq_core::init()?;

    let (config, _warnings) = Config::load_validated(args.config.as_deref())?;

    let coord = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        _ => config.location.coordinate().ok_or_else(|| {
            AppError::from(ConfigError::MissingSetting(
                "location (pass --lat/--lon or set [location] in the config)".to_string(),
            ))
        })?,
    };
    tracing::info!("Querying air quality at {}, {}", coord.latitude, coord.longitude);
    let location: Arc<dyn LocationProvider> = Arc::new(FixedLocation::new(coord));

    let client =
        AirKoreaClient::new(config.client_settings()).context("Failed to build AirKorea client")?;
    let pipeline = Arc::new(QueryPipeline::with_client(Arc::new(client)));

    let result = if args.widget {
        let mut widget = Widget::new(config.ui.locale);
        let result = refresh_once(&widget, location, &pipeline).await?;
        widget.on_result(result.as_ref());
        println!("{}", widget.render_line());
        result
    } else {
        let mut screen = MainScreen::new(config.ui.locale);
        let result = refresh_once(&screen, location, &pipeline).await?;
        screen.on_result(result.as_ref());
        print!("{}", screen.render_text(config.ui.show_units));
        if screen.is_error_visible() {
            println!();
        }
        result
    };

    result.map(|_| ()).map_err(|e| AppError::from(e).into())
}

/// Request one refresh for `surface` and wait for its result.
async fn refresh_once(
    surface: &dyn Surface,
    location: Arc<dyn LocationProvider>,
    pipeline: &Arc<QueryPipeline>,
) -> Result<Result<QueryOutcome, AirQualityError>> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let started = request_air_quality_fetch(
        &tx,
        &tokio::runtime::Handle::current(),
        surface,
        location,
        pipeline,
    );
    if !started {
        anyhow::bail!("Surface no longer accepts refreshes");
    }

    let Some(AirQualityServiceMessage::FetchDone(result)) = rx.recv().await else {
        anyhow::bail!("Air quality request ended without a result");
    };
    Ok(result)
}
