use arboretum::{DatasetSpec, Palette, Session, SessionConfig, ViewKind};
use arboretum_core::NodeId;
use serde_json::Value;
use std::io::Read;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Session(arboretum::Error),
    Json(serde_json::Error),
    UnknownDataset(String),
    UnknownPalette(String),
    UnknownNode(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Session(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::UnknownDataset(name) => write!(
                f,
                "unknown dataset `{name}` (known: animals, flare, sp500, orchestras)"
            ),
            CliError::UnknownPalette(name) => write!(f, "unknown palette `{name}`"),
            CliError::UnknownNode(path) => write!(f, "no node at path `{path}`"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<arboretum::Error> for CliError {
    fn from(value: arboretum::Error) -> Self {
        Self::Session(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// One scripted interaction. Paths are `/`-separated names from the root.
#[derive(Debug, Clone, PartialEq)]
enum Op {
    ClickTree(String),
    ClickMap(String),
    Hover(String),
    Exit,
    Tick(f64),
}

impl FromStr for Op {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "exit" {
            return Ok(Self::Exit);
        }
        let (kind, arg) = s.split_once(':').ok_or(())?;
        match kind {
            "click-tree" => Ok(Self::ClickTree(arg.to_string())),
            "click-map" => Ok(Self::ClickMap(arg.to_string())),
            "hover" => Ok(Self::Hover(arg.to_string())),
            "tick" => {
                let ms = arg.parse::<f64>().map_err(|_| ())?;
                if ms.is_finite() && ms >= 0.0 {
                    Ok(Self::Tick(ms))
                } else {
                    Err(())
                }
            }
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    pretty: bool,
    dataset: Option<String>,
    value_field: Option<String>,
    config: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    palette: Option<String>,
    ops: Vec<Op>,
}

fn usage() -> &'static str {
    "arboretum-cli\n\
\n\
USAGE:\n\
  arboretum-cli [--pretty] [--dataset <name>|--value-field <field>] [--config <path>]\n\
                [--width <w>] [--height <h>] [--palette <name>]\n\
                [--op click-tree:<path>|click-map:<path>|hover:<path>|exit|tick:<ms>]...\n\
                [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the JSON hierarchy is read from stdin.\n\
  - Node paths are '/'-separated names starting at the root, e.g. flare/vis/data.\n\
    A '/' inside a name is written as '\\/'.\n\
  - Known datasets: animals, flare, sp500, orchestras. Without one, leaf values are read\n\
    from --value-field (default: size).\n\
  - --width/--height apply to both panels; --config reads a JSON SessionConfig.\n\
  - Ops run in order at the current clock; tick:<ms> advances it. The frame printed is the\n\
    one where every transition has finished.\n\
  - Set RUST_LOG (e.g. RUST_LOG=arboretum=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => args.pretty = true,
            "--dataset" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.dataset = Some(name.clone());
            }
            "--value-field" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.value_field = Some(name.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = Some(w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = Some(h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--palette" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.palette = Some(name.clone());
            }
            "--op" => {
                let Some(op) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.ops
                    .push(op.parse::<Op>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.dataset.is_some() && args.value_field.is_some() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn session_config(args: &Args) -> Result<SessionConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => SessionConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => SessionConfig::default(),
    };
    if let Some(w) = args.width {
        config.nodelink.width = w;
        config.treemap.width = w;
    }
    if let Some(h) = args.height {
        config.nodelink.height = h;
        config.treemap.height = h;
    }
    if let Some(name) = args.palette.as_deref() {
        config.palette =
            Palette::from_name(name).ok_or_else(|| CliError::UnknownPalette(name.to_string()))?;
    }
    Ok(config)
}

fn dataset(args: &Args) -> Result<DatasetSpec, CliError> {
    match (args.dataset.as_deref(), args.value_field.as_deref()) {
        (Some(name), _) => {
            DatasetSpec::lookup(name).ok_or_else(|| CliError::UnknownDataset(name.to_string()))
        }
        (None, Some(field)) => Ok(DatasetSpec::new("custom", field)),
        (None, None) => Ok(DatasetSpec::new("custom", "size")),
    }
}

fn resolve(session: &Session, path: &str) -> Result<NodeId, CliError> {
    session
        .find(path)
        .ok_or_else(|| CliError::UnknownNode(path.to_string()))
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let record: Value = serde_json::from_str(&text)?;
    let config = session_config(&args)?;
    let spec = dataset(&args)?;
    let settle = config.transition.duration_ms;

    let mut session = Session::new(config);
    session.on_root_change(|change| {
        tracing::info!(
            root = %change.name,
            nodes = change.nodes,
            domain_min = change.color_domain.0,
            domain_max = change.color_domain.1,
            "dataset loaded"
        );
    });

    let mut now = 0.0;
    session.load_dataset(&spec, &record, now)?;
    for op in &args.ops {
        match op {
            Op::ClickTree(path) => {
                let node = resolve(&session, path)?;
                let outcome = session.click(ViewKind::NodeLink, node, now)?;
                tracing::debug!(path = %path, ?outcome, "click-tree");
            }
            Op::ClickMap(path) => {
                let node = resolve(&session, path)?;
                let outcome = session.click(ViewKind::Treemap, node, now)?;
                tracing::debug!(path = %path, ?outcome, "click-map");
            }
            Op::Hover(path) => {
                let node = resolve(&session, path)?;
                session.hover(node)?;
            }
            Op::Exit => session.exit()?,
            Op::Tick(ms) => {
                now += ms;
                session.tick(now)?;
            }
        }
    }

    let end = now + settle;
    session.tick(end)?;
    let frame = session.frame(end)?;
    if args.pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &frame)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), &frame)?;
    }
    println!();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::UnknownNode(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
