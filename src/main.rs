mod braille;
mod ui;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dotted_map::{
    BoundingBox, CountryIndex, DottedMap, GridMode, MapSettings, Pin, Shape, SvgOptions,
    SvgSettings,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dotted-map", version, about = "Dot-grid maps rendered to SVG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the map as SVG
    Svg {
        #[command(flatten)]
        map: MapArgs,
        #[command(flatten)]
        style: StyleArgs,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the built map as JSON
    Json {
        #[command(flatten)]
        map: MapArgs,
        /// Keep the region polygon so imported maps can reject outer pins
        #[arg(long)]
        with_polygon: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the map in the terminal
    Preview {
        #[command(flatten)]
        map: MapArgs,
    },
}

#[derive(Args)]
struct MapArgs {
    /// JSON file with map settings; flags override its values
    #[arg(long)]
    settings: Option<PathBuf>,
    /// GeoJSON FeatureCollection of country boundaries
    #[arg(long)]
    data: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Country ids, comma separated (e.g. USA,FRA)
    #[arg(long, value_delimiter = ',')]
    countries: Vec<String>,
    /// Explicit box as lat_min,lat_max,lng_min,lng_max
    #[arg(long, allow_hyphen_values = true)]
    region: Option<String>,
    /// vertical or diagonal
    #[arg(long)]
    grid: Option<String>,
    #[arg(long)]
    avoid_outer_pins: bool,
    /// Pin as lat,lng[,color]; repeatable
    #[arg(long = "pin", allow_hyphen_values = true)]
    pins: Vec<String>,
}

#[derive(Args)]
struct StyleArgs {
    /// circle or hexagon
    #[arg(long, default_value = "circle")]
    shape: String,
    #[arg(long, default_value = "currentColor")]
    color: String,
    #[arg(long, default_value = "transparent")]
    background: String,
    #[arg(long, default_value_t = 0.5)]
    radius: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Svg { map, style, output } => {
            let dotted = open_map(&map)?;
            let settings = SvgSettings {
                shape: Shape::from(style.shape.as_str()),
                color: style.color,
                background_color: style.background,
                radius: style.radius,
            };
            write_output(output.as_deref(), &dotted.to_svg(&settings))
        }
        Command::Json {
            map,
            with_polygon,
            output,
        } => {
            let dotted = open_map(&map)?;
            let json = dotted.model().to_json(with_polygon)?;
            write_output(output.as_deref(), &json)
        }
        Command::Preview { map } => {
            let dotted = open_map(&map)?;
            ui::run_preview(&dotted)
        }
    }
}

/// Load the dataset, build the map and place the requested pins
fn open_map(args: &MapArgs) -> Result<DottedMap> {
    let index = match &args.data {
        Some(path) => CountryIndex::load(path)
            .with_context(|| format!("loading country dataset {}", path.display()))?,
        None => {
            info!("no dataset given, using built-in simplified outlines");
            CountryIndex::simple_world()
        }
    };

    let settings = map_settings(args)?;
    let map = DottedMap::new(&index, &settings)?;

    for raw in &args.pins {
        let pin = parse_pin(raw)?;
        if map.add_pin(pin).is_none() {
            warn!(pin = %raw, "pin is outside the map region, skipped");
        }
    }
    Ok(map)
}

fn map_settings(args: &MapArgs) -> Result<MapSettings> {
    let mut settings: MapSettings = match &args.settings {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading settings {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing settings {}", path.display()))?
        }
        None => MapSettings::default(),
    };

    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    if !args.countries.is_empty() {
        settings.countries = args.countries.clone();
    }
    if let Some(region) = &args.region {
        settings.region = Some(parse_region(region)?);
    }
    if let Some(grid) = &args.grid {
        settings.grid = grid.parse::<GridMode>()?;
    }
    settings.avoid_outer_pins |= args.avoid_outer_pins;
    Ok(settings)
}

fn parse_numbers(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("{part:?} is not a number"))
        })
        .collect()
}

fn parse_region(s: &str) -> Result<BoundingBox> {
    let values = parse_numbers(s)?;
    let [lat_min, lat_max, lng_min, lng_max] = values.as_slice() else {
        bail!("region must be lat_min,lat_max,lng_min,lng_max, got {s:?}");
    };
    Ok(BoundingBox::new(*lat_min, *lat_max, *lng_min, *lng_max))
}

fn parse_pin(s: &str) -> Result<Pin> {
    let (coords, color) = match s.splitn(3, ',').collect::<Vec<_>>()[..] {
        [lat, lng] => (parse_numbers(&[lat, lng].join(","))?, None),
        [lat, lng, color] => (parse_numbers(&[lat, lng].join(","))?, Some(color)),
        _ => bail!("pin must be lat,lng[,color], got {s:?}"),
    };
    let svg_options = color.map(|color| SvgOptions {
        color: Some(color.trim().to_string()),
        radius: None,
    });
    Ok(Pin {
        svg_options,
        ..Pin::new(coords[0], coords[1])
    })
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
