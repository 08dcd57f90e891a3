use crate::network::{BayesNetError, Result};
use clap::{Arg, ArgMatches, Command, ValueEnum, builder::EnumValueParser, value_parser};
use env_logger::{Builder, Env};
use serde::Deserialize;
use std::io::Write;

/// Learner selected on the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Kdb,
    #[value(name = "kdb_ld")]
    KdbLd,
    Tan,
    Spode,
    Aode,
    #[value(name = "aode_ld")]
    AodeLd,
}

impl ModelKind {
    /// The tag used by `ModelConfig`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Kdb => "kdb",
            ModelKind::KdbLd => "kdb_ld",
            ModelKind::Tan => "tan",
            ModelKind::Spode => "spode",
            ModelKind::Aode => "aode",
            ModelKind::AodeLd => "aode_ld",
        }
    }
}

/// These options define the inputs from the user.
#[derive(Deserialize, Clone, Debug)]
pub struct CommandLineOptions {
    pub dataset: String,
    pub model: ModelKind,
    pub hyperparameters: String,
    pub test_ratio: f64,
    pub seed: u64,
    pub show_graph: bool,
    pub dump_cpt: bool,
}

/// `LEVEL [file:line] message`, filtered by `RUST_LOG` with `info` by default.
pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(buf, "{} [{}:{}] {}", record.level(), file, line, record.args())
        })
        .init();
}

pub fn command() -> Command {
    Command::new("BAYESNET")
        .version("1.0")
        .about("Learns Bayesian network classifiers from labeled tabular data.")
        .arg(
            Arg::new("dataset")
                .long("dataset")
                .value_name("FILE")
                .help("JSON file with features, class_name, samples, labels and optional weights")
                .required(true),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_parser(EnumValueParser::<ModelKind>::new())
                .help("Learner to train")
                .default_value("kdb_ld"),
        )
        .arg(
            Arg::new("hyperparameters")
                .long("hyperparameters")
                .value_name("JSON")
                .help("Hyperparameters as a JSON object, e.g. '{\"k\": 3}'")
                .default_value("{}"),
        )
        .arg(
            Arg::new("test_ratio")
                .long("test_ratio")
                .value_name("RATIO")
                .value_parser(value_parser!(f64))
                .help("Fraction of the samples held out for testing")
                .default_value("0.3"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("NUMBER")
                .value_parser(value_parser!(u64))
                .help("Seed of the train/test shuffle")
                .default_value("271"),
        )
        .arg(
            Arg::new("show_graph")
                .long("show_graph")
                .help("Prints the learned structure in Graphviz format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dump_cpt")
                .long("dump_cpt")
                .help("Prints every conditional probability table")
                .action(clap::ArgAction::SetTrue),
        )
}

pub fn options_from_matches(matches: &ArgMatches) -> Result<CommandLineOptions> {
    let dataset = matches
        .get_one::<String>("dataset")
        .cloned()
        .ok_or_else(|| BayesNetError::InvalidConfig("dataset is required".to_string()))?;
    let model = matches.get_one::<ModelKind>("model").copied().unwrap_or(ModelKind::KdbLd);
    let hyperparameters = matches
        .get_one::<String>("hyperparameters")
        .cloned()
        .unwrap_or_default();
    let test_ratio = matches.get_one::<f64>("test_ratio").copied().unwrap_or(0.3);
    if !(0.0..1.0).contains(&test_ratio) {
        return Err(BayesNetError::InvalidConfig(format!(
            "test_ratio must be in [0, 1), found {}",
            test_ratio
        )));
    }
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(271);

    Ok(CommandLineOptions {
        dataset,
        model,
        hyperparameters,
        test_ratio,
        seed,
        show_graph: matches.get_flag("show_graph"),
        dump_cpt: matches.get_flag("dump_cpt"),
    })
}

pub fn parse_configuration_options() -> Result<CommandLineOptions> {
    init_logger();
    options_from_matches(&command().get_matches())
}
