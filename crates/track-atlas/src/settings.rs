use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use track_atlas_lib::Config;

/// Encoding of the written pages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Atlas - Split long GPS tracks into printable, annotated map pages
pub struct Settings {
    /// GPX file holding the track to print
    #[clap(value_name = "GPX")]
    pub track: PathBuf,

    /// Directory of map tiles laid out as {layer}/{level}/{col}/{row}.{ext}
    #[clap(short, long, value_name = "DIR")]
    pub tiles: PathBuf,

    /// Extension of the tile images
    #[clap(long, default_value = "png")]
    pub tile_ext: String,

    /// JSON file with an array of named places used to title the pages
    #[clap(short, long, value_name = "FILE")]
    pub places: Option<PathBuf>,

    /// Directory the pages and the index are written to
    #[clap(short, long, default_value = "atlas")]
    pub output: PathBuf,

    /// Encoding of the page images
    #[clap(long, value_enum, default_value_t = ImageFormat::Jpg)]
    pub image_format: ImageFormat,

    /// JSON rendering configuration; the flags below override its values
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// TrueType font used for chart text and tick labels
    #[clap(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Paper format: A0-A4, letter, legal or a size like 21x29.7cm
    #[clap(long)]
    pub format: Option<String>,

    /// Print resolution in dots per inch
    #[clap(long)]
    pub dpi: Option<f64>,

    /// Web-Mercator zoom level of the tiles
    #[clap(short, long)]
    pub zoom: Option<u8>,

    /// Margin kept around the track on each page, in centimeters
    #[clap(long)]
    pub margin_cm: Option<f64>,

    /// White frame around each page, in pixels
    #[clap(long)]
    pub border_px: Option<u32>,

    /// Tile layer name
    #[clap(long)]
    pub layer: Option<String>,

    /// Distance between ticks along the track, in kilometers
    #[clap(long)]
    pub tick_step_km: Option<f64>,

    /// Sample one in this many points for the elevation profile
    #[clap(long)]
    pub profile_stride: Option<usize>,

    /// Factor applied to measured distances
    #[clap(long)]
    pub distance_calibration: Option<f64>,

    /// Search radius around each page for place names, in kilometers
    #[clap(long)]
    pub place_radius_km: Option<f64>,

    /// Track line width in pixels
    #[clap(long)]
    pub line_width: Option<f32>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[clap(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Settings {
    /// Rendering configuration: the config file if any, then the command-line overrides
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        if let Some(layer) = &self.layer {
            config.layer = layer.clone();
        }
        override_with(&mut config.dpi, self.dpi);
        override_with(&mut config.zoom_level, self.zoom);
        override_with(&mut config.margin_cm, self.margin_cm);
        override_with(&mut config.border_px, self.border_px);
        override_with(&mut config.tick_step_km, self.tick_step_km);
        override_with(&mut config.profile_stride, self.profile_stride);
        override_with(&mut config.distance_calibration, self.distance_calibration);
        override_with(&mut config.place_radius_km, self.place_radius_km);
        override_with(&mut config.line_width, self.line_width);
    }
}

fn override_with<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Parse a JSON configuration file; missing keys keep their defaults
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_config_file() {
        let settings = Settings::parse_from(["track-atlas", "ride.gpx", "--tiles", "tiles"]);
        assert_eq!(settings.track, PathBuf::from("ride.gpx"));
        assert_eq!(settings.image_format, ImageFormat::Jpg);
        assert_eq!(settings.config().unwrap(), Config::default());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"format": "A3", "dpi": 300, "zoom_level": 13}}"#).unwrap();

        let path = file.path().to_str().unwrap();
        let settings = Settings::parse_from([
            "track-atlas",
            "ride.gpx",
            "--tiles",
            "tiles",
            "--config",
            path,
            "--zoom",
            "14",
            "--image-format",
            "png",
        ]);
        let config = settings.config().unwrap();
        assert_eq!(config.format, "A3");
        assert_eq!(config.dpi, 300.0);
        assert_eq!(config.zoom_level, 14);
        assert_eq!(config.margin_cm, Config::default().margin_cm);
        assert_eq!(settings.image_format.extension(), "png");
    }

    #[test]
    fn test_invalid_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }
}
