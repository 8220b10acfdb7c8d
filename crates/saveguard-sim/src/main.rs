use anyhow::Result;
use clap::{Arg, ArgAction, Command, builder::PossibleValuesParser};
use saveguard_core::RecoveryConfig;
use tracing_subscriber::EnvFilter;

mod scenarios;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("saveguard-sim")
        .version(saveguard_core::VERSION)
        .about("Save-failure recovery simulator")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a TOML recovery config"),
        )
        .subcommand(
            Command::new("run")
                .about("Run one scenario")
                .arg(
                    Arg::new("scenario")
                        .required(true)
                        .value_parser(PossibleValuesParser::new(scenarios::NAMES))
                        .help("Scenario to run"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("all")
                .about("Run every scenario")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(Command::new("list").about("List scenarios"));

    let matches = cli.get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => RecoveryConfig::load(path).await?,
        None => RecoveryConfig::new(),
    };

    let (names, json): (Vec<&str>, bool) = match matches.subcommand() {
        Some(("run", args)) => {
            let name = args
                .get_one::<String>("scenario")
                .map_or("stale", String::as_str);
            (vec![name], args.get_flag("json"))
        }
        Some(("all", args)) => (scenarios::NAMES.to_vec(), args.get_flag("json")),
        Some(("list", _)) => {
            for name in scenarios::NAMES {
                println!("{name}");
            }
            return Ok(());
        }
        _ => (scenarios::NAMES.to_vec(), false),
    };

    let mut reports = Vec::with_capacity(names.len());
    for name in names {
        reports.push(scenarios::run(name, &config).await?);
    }
    let passed = reports.iter().all(|r| r.passed);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{report}");
            println!();
        }
        println!(
            "{}/{} scenarios passed",
            reports.iter().filter(|r| r.passed).count(),
            reports.len()
        );
    }

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}
