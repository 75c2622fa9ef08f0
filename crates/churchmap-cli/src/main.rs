use anyhow::{bail, Result};
use churchmap_core::{Bounds, FilterField, FilterSession, Profile, RecordingMap};
use churchmap_storage::source::{DEFAULT_CHUNKS, DEFAULT_PREFIX};
use churchmap_storage::{ChunkLoader, DirSource, FeatureStore, LoadReport};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "churchmap")]
#[command(about = "Church map data and filter inspection", long_about = None)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args)]
struct DataArgs {
    #[arg(long, env = "DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,
    #[arg(long, env = "CHUNK_COUNT", default_value_t = DEFAULT_CHUNKS, global = true)]
    chunks: usize,
    #[arg(long, env = "CHUNK_PREFIX", default_value = DEFAULT_PREFIX, global = true)]
    prefix: String,
}

#[derive(Subcommand)]
enum Cmd {
    /// Load every chunk and print the load report.
    Load,
    /// Run the filters once and print the list panel.
    Filter {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        jurisdiction: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        rite: Option<String>,
        /// Map viewport as south,west,north,east
        #[arg(long, value_parser = parse_bbox)]
        bbox: Option<Bounds>,
        #[arg(long)]
        mobile: bool,
        #[arg(long)]
        json: bool,
    },
    /// Autocomplete values for one filter field.
    Suggest {
        #[arg(long)]
        field: FilterField,
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        mobile: bool,
    },
}

fn parse_bbox(s: &str) -> Result<Bounds> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let &[south, west, north, east] = parts.as_slice() else {
        bail!("expected south,west,north,east, got {s:?}");
    };
    if south > north || west > east {
        bail!("bbox corners are out of order");
    }
    Ok(Bounds::new(south, west, north, east))
}

async fn load(data: &DataArgs) -> (FeatureStore, LoadReport) {
    let source = DirSource::new(data.data_dir.clone())
        .with_prefix(data.prefix.clone())
        .with_count(data.chunks);
    ChunkLoader::load(&source, |p| tracing::info!("{}", p.message())).await
}

fn profile(mobile: bool) -> Profile {
    if mobile {
        Profile::Mobile
    } else {
        Profile::Desktop
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Load => {
            let (_, report) = load(&cli.data).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.features == 0 {
                bail!("no church data loaded");
            }
        }
        Cmd::Filter {
            title,
            city,
            country,
            jurisdiction,
            kind,
            rite,
            bbox,
            mobile,
            json,
        } => {
            let (store, _) = load(&cli.data).await;
            let mut session = FilterSession::new(profile(mobile));
            let inputs = [
                (FilterField::Title, title),
                (FilterField::City, city),
                (FilterField::Country, country),
                (FilterField::Jurisdiction, jurisdiction),
                (FilterField::Type, kind),
                (FilterField::Rite, rite),
            ];
            for (field, value) in inputs {
                if let Some(v) = value {
                    session.set_input(field, &v);
                }
            }
            let mut map = match bbox {
                Some(b) => RecordingMap::with_viewport(b),
                None => RecordingMap::new(),
            };
            let manual = session.is_filter_active();
            session.apply(store.features(), &mut map, manual);

            if json {
                println!("{}", serde_json::to_string_pretty(&session.view())?);
                return Ok(());
            }
            println!("{}", session.status());
            for row in session.list().visible_rows() {
                println!("{:>7}  {}  [{}]", row.id, row.title, row.details);
            }
            if let Some(note) = session.list().note() {
                println!("{note}");
            }
            if let Some(empty) = session.list().empty_state() {
                println!("{empty}");
            }
        }
        Cmd::Suggest {
            field,
            query,
            mobile,
        } => {
            let (store, _) = load(&cli.data).await;
            let limit = profile(mobile).suggest_limit();
            for v in store.unique().suggest(field, &query, limit) {
                println!("{v}");
            }
        }
    }
    Ok(())
}
