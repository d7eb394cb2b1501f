mod cli;
mod history_file;

use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, TimeZone, Utc};
use clap::Parser;
use tracing::info;

use cyclic_core::config::{self, ZoneSetting};
use cyclic_core::{number_of_cycles, Config, Cycle};
use cyclic_dependency::{DependencyQuery, DependencyResolver};
use cyclic_schedule::CronSchedule;

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    config::load_dotenv();
    let config = Config::try_from_env().context("invalid CYCLIC_* configuration")?;
    config.log_summary();

    let args = CliArgs::parse();
    let zone = args.timezone.unwrap_or(config.schedule.timezone);
    info!(%zone, "using time zone");

    match zone {
        ZoneSetting::Local => run(Local, &args.command, &config),
        ZoneSetting::Utc => run(Utc, &args.command, &config),
        ZoneSetting::Fixed(_) => {
            let offset: FixedOffset = zone
                .fixed_offset()
                .with_context(|| format!("time zone offset {} is out of range", zone))?;
            run(offset, &args.command, &config)
        }
    }
}

fn run<Tz: TimeZone>(tz: Tz, command: &Command, config: &Config) -> Result<()> {
    match command {
        Command::Inspect { cron, count } => inspect(&tz, cron, *count),
        Command::Schedule { cron, at, offset } => {
            let schedule = CronSchedule::parse(cron)?;
            let time = schedule.schedule_time(&tz, *at, *offset)?;
            println!("{}", time);
            Ok(())
        }
        Command::Check {
            parent,
            child,
            at,
            history,
            lookup,
            anchor,
        } => {
            let parent = CronSchedule::parse(parent).context("invalid --parent cron")?;
            let child = CronSchedule::parse(child).context("invalid --child cron")?;
            let history = history_file::load(history)?;

            let defaults = DependencyQuery::from_config(&config.resolver);
            let query = DependencyQuery::new(
                anchor.unwrap_or(defaults.anchor),
                lookup.unwrap_or(defaults.lookup),
            );

            let resolver = DependencyResolver::with_timezone(tz);
            let governing = resolver.governing_schedule(&parent, &child)?;
            let key = resolver.checkpoint_record(&parent, &child, *at, query.anchor)?;
            let found = resolver.resolve(&parent, &child, *at, &history, query)?;

            println!("governing:  {}", governing);
            println!("checkpoint: {} ({})", key.schedule_time(), query.lookup);
            match found {
                Some(record) => println!("satisfied:  {}", record.schedule_time()),
                None => println!("satisfied:  no (dependency not met yet)"),
            }
            Ok(())
        }
    }
}

fn inspect<Tz: TimeZone>(tz: &Tz, cron: &str, count: usize) -> Result<()> {
    let schedule = CronSchedule::parse(cron)?;
    let interval = schedule.interval_in(tz)?;
    let cycle = Cycle::classify(interval);

    println!("cron:       {}", schedule);
    println!("interval:   {}ms", interval);
    println!("cycle:      {} (code {})", cycle, cycle.code());
    if let Some(unit) = cycle.truncation_unit() {
        println!("truncate:   {:?}", unit);
        println!("cycles:     {}", number_of_cycles(interval)?);
    }
    println!("retention:  {}", cycle.retention_size());
    for fire in schedule.upcoming_in(tz, count) {
        println!("next:       {}", fire.naive_local());
    }
    Ok(())
}
