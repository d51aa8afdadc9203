use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Distributed essay publishing and peer review platform.")]
pub struct MainOptions {
    /// Log level, scopable to different modules
    ///
    /// Levels: trace, debug, info, warn, error
    #[structopt(
        short,
        long,
        global = true,
        default_value = "info,redis=warn,hyper=warn",
        env = "RUST_LOG",
        value_name = "level"
    )]
    pub log: String,

    /// Format in which log lines are printed
    ///
    /// Formats: text, compact, json
    #[structopt(long, global = true, env, default_value = "text")]
    pub log_format: LogFormat,

    /// Enable status reporting server which can be used as a readiness probe
    #[structopt(long, global = true, env, value_name = "port")]
    pub status_server: Option<u16>,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Essay management services
    Essay(scriptorium::module::essay::Options),
    /// Review management services
    Review(scriptorium::module::review::Options),
    /// Notification management services
    Notifier(scriptorium::module::notifier::Options),
}

#[derive(Debug)]
pub enum LogFormat {
    Text,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}
