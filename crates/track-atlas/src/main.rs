mod chart;
mod logging;
mod output;
mod settings;
mod sources;

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::time::Instant;
use track_atlas_lib::{PageRenderer, raster, read_track};

use crate::chart::PlottersChart;
use crate::settings::Settings;
use crate::sources::{DirTileSource, PlaceFile, TrackElevations};

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    logging::setup_logging(settings.verbose);
    let started = Instant::now();

    let config = settings.config()?;
    tracing::debug!(?config, "Configuration resolved");

    let file = File::open(&settings.track)
        .with_context(|| format!("failed to open track {}", settings.track.display()))?;
    let track = read_track(file)
        .with_context(|| format!("failed to read track {}", settings.track.display()))?;
    tracing::info!(
        name = %track.name,
        points = track.len(),
        distance_km = track.distance_km(),
        "Track loaded"
    );

    let tiles = DirTileSource::new(&settings.tiles, settings.tile_ext.as_str());
    let places = match &settings.places {
        Some(path) => PlaceFile::load(path)?,
        None => {
            tracing::warn!("No places file given, pages will be named after unknown places");
            PlaceFile::default()
        }
    };
    let elevations = TrackElevations::from_track(&track);

    let font = settings
        .font
        .as_ref()
        .map(|path| {
            std::fs::read(path).with_context(|| format!("failed to read font {}", path.display()))
        })
        .transpose()?;
    let chart = match &font {
        Some(bytes) => PlottersChart::with_font(bytes.clone())?,
        None => PlottersChart::new(),
    };

    let mut renderer = PageRenderer::new(config, &tiles, &elevations, &places, &chart)?;
    if let Some(bytes) = font {
        renderer = renderer.with_font(raster::load_font(bytes)?);
    }

    let pages = renderer
        .render_path(&track.points)
        .context("failed to render pages")?;
    let written = output::write_pages(&settings.output, &pages, settings.image_format)?;

    tracing::info!(
        pages = written.len(),
        elapsed_s = started.elapsed().as_secs(),
        "Atlas written to {}",
        settings.output.display()
    );
    Ok(())
}
