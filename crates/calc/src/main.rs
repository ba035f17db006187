use anyhow::Context;
use calc::{Config, Repl};
use clap::{Parser, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calc", version, about = "Evaluates integer arithmetic expressions")]
struct Args {
    /// Evaluate EXPR and exit instead of starting the REPL (can be repeated)
    #[arg(short, long = "expr", value_name = "EXPR")]
    exprs: Vec<String>,

    /// Text printed before each line is read
    #[arg(long, default_value = "> ")]
    prompt: String,

    /// Don't print the greeting when the REPL starts
    #[arg(long)]
    no_banner: bool,

    /// When to highlight errors
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// How many parentheses and unary minuses may enclose an operand
    #[arg(long, default_value_t = eval::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log filter directives, e.g. `debug` or `eval=trace`
    #[arg(long, env = "CALC_LOG", default_value = "warn")]
    log: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log)?;

    let color = match args.color {
        ColorChoice::Auto => io::stdout().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let config =
        Config { prompt: args.prompt, banner: !args.no_banner, color, max_depth: args.max_depth };

    if !args.exprs.is_empty() {
        if !eval_exprs(&args.exprs, &config)? {
            process::exit(1);
        }

        return Ok(());
    }

    let summary = Repl::new(config).run(io::stdin().lock(), io::stdout().lock())?;
    tracing::info!(evaluated = summary.evaluated, failed = summary.failed, "session finished");

    Ok(())
}

/// Returns whether every expression evaluated successfully.
fn eval_exprs(exprs: &[String], config: &Config) -> anyhow::Result<bool> {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let mut all_ok = true;

    for expr in exprs {
        match calc::eval_line(expr, config) {
            Ok(value) => writeln!(stdout, "{}", value)?,
            Err(lines) => {
                all_ok = false;

                for line in lines {
                    writeln!(stderr, "{}", line)?;
                }
            }
        }
    }

    stdout.flush()?;

    Ok(all_ok)
}

fn init_logging(filter: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter `{}`", filter))?;

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    Ok(())
}
