mod cli;
mod commands;
mod logging;


use cli::{DumpParams, ExecParams, TraceParams, build_cli, init_logging, log_settings};

fn main() {
    let matches = build_cli().get_matches();

    let options = log_settings(&matches).merged_with_env().resolved();
    init_logging(&options);
    tracing::debug!(
        log_level = %options.level,
        log_format = %options.format,
        "logging initialised"
    );

    match matches.subcommand() {
        Some(("exec", m)) => {
            let params = ExecParams::from_matches(m);
            commands::exec::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        Some(("trace", m)) => {
            let params = TraceParams::from_matches(m);
            commands::trace::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
