use std::fmt;
use std::process;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, TimeDelta};
use rsargs::cli::output;
use rsargs::{exitcode, Command, CommandLine, CommandLineError, Parameter, Settings, SpecError};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, Layer};

/// Two-part value written as `first|second`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Bar {
    first: String,
    second: String,
}

impl FromStr for Bar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split('|').collect::<Vec<_>>().as_slice() {
            [first, second] if !first.is_empty() && !second.is_empty() => Ok(Bar {
                first: first.to_string(),
                second: second.to_string(),
            }),
            _ => Err(format!("expected 'first|second', got '{s}'")),
        }
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.first, self.second)
    }
}

#[derive(Debug, Default)]
struct CommandAParams {
    name: String,
    count: i32,
    factor: f32,
    date_time: NaiveDateTime,
    debug: bool,
    bar: Bar,
}

#[derive(Debug, Default)]
struct CommandBParams {
    thing: String,
    duration: TimeDelta,
}

fn build_command_line(settings: &Settings) -> Result<CommandLine, SpecError> {
    let now = Local::now().naive_local();

    let cmd_a = Command::<CommandAParams>::new("cmd-a", "Runs command A")?
        .handler(|params| {
            println!("{params:#?}");
            exitcode::OK
        })
        .parameter(
            Parameter::<String>::new("name", "A name")?.alias("n")?,
            |p: &mut CommandAParams, v| p.name = v,
        )?
        .parameter(
            Parameter::<i32>::new("count", "How many")?.alias("c")?,
            |p: &mut CommandAParams, v| p.count = v,
        )?
        .parameter(
            Parameter::<f32>::new("factor", "Scale factor")?.alias("f")?,
            |p: &mut CommandAParams, v| p.factor = v,
        )?
        .parameter(
            Parameter::<NaiveDateTime>::new("date-time", "Point in time")?
                .alias("dt")?
                .optional(now),
            |p: &mut CommandAParams, v| p.date_time = v,
        )?
        .parameter(
            Parameter::<bool>::new("debug", "Debug output")?
                .alias("d")?
                .optional(false),
            |p: &mut CommandAParams, v| p.debug = v,
        )?
        .parameter(
            Parameter::<Bar>::from_str_type("bar", "Pair as first|second")?.alias("b")?,
            |p: &mut CommandAParams, v| p.bar = v,
        )?;

    let cmd_b = Command::<CommandBParams>::new("cmd-b", "Runs command B")?
        .handler(|params| {
            println!("{params:#?}");
            exitcode::OK
        })
        .parameter(
            Parameter::<String>::new("thing", "Some thing")?.alias("t")?,
            |p: &mut CommandBParams, v| p.thing = v,
        )?
        .parameter(
            Parameter::<TimeDelta>::new("duration", "Time span [d.]hh:mm[:ss]")?.alias("d")?,
            |p: &mut CommandBParams, v| p.duration = v,
        )?;

    CommandLine::new("Demo of typed command-line parsing")
        .with_settings(settings)
        .with_trace_fn(|line| println!("{line}"))
        .add_command(cmd_a)?
        .add_command(cmd_b)
}

fn main() {
    let settings = match Settings::load(None) {
        Ok(settings) => settings,
        Err(e) => {
            output::error_chain(&e);
            process::exit(e.exit_code());
        }
    };

    setup_logging(settings.verbosity);

    let cli = match build_command_line(&settings) {
        Ok(cli) => cli,
        Err(e) => {
            let e = CommandLineError::from(e);
            output::error_chain(&e);
            process::exit(e.exit_code());
        }
    };

    match cli.invoke_from_env() {
        Ok(code) => process::exit(code),
        Err(e) => {
            let e = CommandLineError::from(e);
            output::error_chain(&e);
            output::info(&cli.usage());
            process::exit(e.exit_code());
        }
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max verbosity is 3");
            LevelFilter::TRACE
        }
    };

    let fmt_layer = tracing_fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
