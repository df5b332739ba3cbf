use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use diagnos_cli::evaluate::{default_config_json, render_report, run_evaluation, EvaluateOptions};

fn main() -> Result<()> {
    let matches = Command::new("diagnos")
        .version(clap::crate_version!())
        .about("Feature pipeline and multi-model evaluation for tabular diagnostic data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Split, preprocess, train every model and report metrics")
                .arg(
                    Arg::new("data")
                        .help("Path to the labeled CSV dataset")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a JSON pipeline configuration. Defaults are used when omitted.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .help("Seed for partitioning and oversampling. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("threads")
                        .short('t')
                        .long("threads")
                        .help("Worker threads for model training and scoring.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the results as JSON.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("config").about("Print the default configuration as JSON"))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    init_logging(&matches);

    match matches.subcommand() {
        Some(("evaluate", sub_m)) => handle_evaluate(sub_m),
        Some(("config", _)) => {
            println!("{}", default_config_json()?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn init_logging(matches: &ArgMatches) {
    let mut builder = env_logger::Builder::default();
    builder
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("DIAGNOS_LOG", "error,diagnos=info"));
    match matches.get_count("verbose") {
        0 => {}
        1 => {
            builder.filter_module("diagnos", LevelFilter::Debug);
        }
        _ => {
            builder.filter_module("diagnos", LevelFilter::Trace);
        }
    }
    builder.init();
}

fn handle_evaluate(matches: &ArgMatches) -> Result<()> {
    let options = EvaluateOptions {
        data: matches
            .get_one::<PathBuf>("data")
            .cloned()
            .unwrap_or_default(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        seed: matches.get_one::<u64>("seed").copied(),
        threads: matches.get_one::<usize>("threads").copied(),
        output: matches.get_one::<PathBuf>("output_file").cloned(),
    };
    log::info!("[diagnos] Evaluating {:?}", options.data);

    match run_evaluation(&options) {
        Ok(summary) => {
            print!("{}", render_report(&summary));
            Ok(())
        }
        Err(e) => {
            log::error!("Evaluation failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
