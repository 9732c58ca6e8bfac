use clap::{value_parser, Arg, ArgAction, Command};
use gis_simplifier::{
    process_files, resolve_inputs, BatchMode, ConflictPolicy, Options, Terminal, DEFAULT_SUFFIX,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let matches = Command::new("GIS Simplifier")
        .version("1.0")
        .author("Jesper Fjellin")
        .about("Simplifies polygon coverages in GeoJSON files without opening gaps or overlaps")
        .arg(
            Arg::new("files")
                .num_args(0..)
                .value_name("FILE")
                .help("Input GeoJSON files (prompted for when omitted)"),
        )
        .arg(
            Arg::new("tolerance")
                .short('t')
                .long("tolerance")
                .value_parser(value_parser!(f64))
                .allow_negative_numbers(true)
                .help("Simplification tolerance in the units of the data's CRS [default: 1e-6]"),
        )
        .arg(
            Arg::new("suffix")
                .long("suffix")
                .default_value(DEFAULT_SUFFIX)
                .help("Text inserted before the extension of each output file"),
        )
        .arg(
            Arg::new("on-conflict")
                .long("on-conflict")
                .value_parser(["ask", "overwrite", "rename", "fail"])
                .default_value("ask")
                .help("What to do when the output file already exists"),
        )
        .arg(
            Arg::new("keep-going")
                .short('k')
                .long("keep-going")
                .action(ArgAction::SetTrue)
                .help("Continue with the remaining files when one fails"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log progress"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Log simplification details"),
        )
        .get_matches();

    let level = if matches.get_flag("debug") {
        Level::DEBUG
    } else if matches.get_flag("verbose") {
        Level::INFO
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }

    let mut options = Options::default();
    if let Some(tolerance) = matches.get_one::<f64>("tolerance") {
        options.tolerance = *tolerance;
    }
    if let Some(suffix) = matches.get_one::<String>("suffix") {
        options.suffix = suffix.clone();
    }
    if let Some(policy) = matches
        .get_one::<String>("on-conflict")
        .map(String::as_str)
        .and_then(ConflictPolicy::from_name)
    {
        options.conflict = policy;
    }
    if matches.get_flag("keep-going") {
        options.batch = BatchMode::KeepGoing;
    }

    let args: Vec<String> = matches
        .get_many::<String>("files")
        .map(|files| files.cloned().collect())
        .unwrap_or_default();

    let mut prompt = Terminal::stdio();
    let result = resolve_inputs(args, &mut prompt)
        .and_then(|files| process_files(&files, &options, &mut prompt));

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for file in &report.processed {
        println!("Written {}", file.output.display());
    }
    if !report.is_success() {
        for (path, e) in &report.failed {
            eprintln!("Error processing {}: {}", path.display(), e);
        }
        eprintln!("{} of {} files failed", report.failed.len(), report.failed.len() + report.processed.len());
        std::process::exit(1);
    }
}
