use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use co2view_rs::{charts, dataset, render, stats, storage};
use co2view_rs::{Dataset, Metric, SelectionState};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "co2view",
    version,
    about = "Explore, visualize & summarize a CO2 emissions dataset"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the dashboard charts to SVG/PNG files (and optionally print stats).
    Render(RenderArgs),
    /// Re-export the dataset as CSV or JSON.
    Export(ExportArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MetricArg {
    Emissions,
    PerCapita,
    PerGdp,
}

impl From<MetricArg> for Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Emissions => Metric::Emissions,
            MetricArg::PerCapita => Metric::PerCapita,
            MetricArg::PerGdp => Metric::PerGdp,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// GeoJSON world-geometry document.
    #[arg(short, long)]
    geometry: PathBuf,
    /// Emissions CSV.
    #[arg(short, long)]
    csv: PathBuf,
    /// Year to render (defaults to the dataset's first year).
    #[arg(short, long)]
    year: Option<i32>,
    /// Metric to color the map and bar chart by.
    #[arg(short, long, value_enum, default_value_t = MetricArg::Emissions)]
    metric: MetricArg,
    /// Country filter for the bar chart.
    #[arg(long, default_value = "")]
    country: String,
    /// Write the map chart here (.svg or .png).
    #[arg(long)]
    map: Option<PathBuf>,
    /// Write the bar chart here (.svg or .png).
    #[arg(long)]
    bar: Option<PathBuf>,
    /// Write the pie chart here (.svg or .png).
    #[arg(long)]
    pie: Option<PathBuf>,
    /// Width of each chart (default 900).
    #[arg(long, default_value_t = 900)]
    width: u32,
    /// Height of each chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Print per-continent statistics for the chosen metric.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Emissions CSV.
    #[arg(short, long)]
    csv: PathBuf,
    /// Output file (format inferred by --format or extension).
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut data = Dataset::load(&args.geometry, &args.csv)?;
    let (min_year, max_year) = data.year_extent();

    let mut state = SelectionState::new(min_year);
    state.selected_metric = args.metric.into();
    if !args.country.is_empty() {
        state.selected_country = Some(args.country.clone());
    }
    if let Some(year) = args.year {
        state.selected_year = year.clamp(min_year, max_year);
    }
    data.attach_year(state.selected_year);

    let (w, h) = (args.width as f64, args.height as f64);

    if let Some(path) = args.map.as_ref() {
        let scene = charts::map::update(&data.features, &state, w, h);
        render::export_map(&scene, path)?;
        eprintln!("Wrote map to {}", path.display());
    }

    if let Some(path) = args.bar.as_ref() {
        let mut scene = charts::bar::update(
            &data.records,
            state.selected_metric,
            state.selected_country.as_deref().unwrap_or(""),
            w,
            // The dashboard's bar surface is shorter than the others.
            h / 1.4,
        );
        charts::bar::highlight(&mut scene, state.selected_year);
        render::export_bar(&scene, path)?;
        eprintln!("Wrote bar chart to {}", path.display());
    }

    if let Some(path) = args.pie.as_ref() {
        let scene = charts::pie::update(&data.records, state.selected_year, w, h);
        render::export_pie(&scene, path, args.width, args.height)?;
        eprintln!("Wrote pie chart to {}", path.display());
    }

    if args.stats {
        for s in stats::grouped_summary(&data.records, state.selected_metric) {
            println!(
                "{}  count={} missing={}  min={} max={} mean={} median={}",
                s.continent,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }

    Ok(())
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let records = dataset::read_records(&args.csv)?;
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => args
            .out
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(&records, &args.out)?,
        "json" => storage::save_json(&records, &args.out)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", records.len(), args.out.display());
    Ok(())
}
