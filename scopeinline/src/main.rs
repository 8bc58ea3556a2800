use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, warn};
use scopeinline_lib::scope::{check_stylesheet, CssRewriter, ScopeConfig, ScopeId};
use scopeinline_lib::scope_generate::scope_inline::{self, FileJob};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const SCOPEINLINE_INTRO: &str = r#"
   ___  ___ ___  _ __   ___  (_)_ __ | (_)_ __   ___
  / __|/ __/ _ \| '_ \ / _ \ | | '_ \| | | '_ \ / _ \
  \__ \ (_| (_) | |_) |  __/ | | | | | | | | | |  __/
  |___/\___\___/| .__/ \___| |_|_| |_|_|_|_| |_|\___|
                |_|
  Scope inline <style> blocks to the element that holds them.
"#;

#[derive(Parser)]
#[command(name = "scopeinline")]
#[command(about = "Scope inline <style> blocks with me / this / self selectors")]
#[command(before_help = SCOPEINLINE_INTRO)]
struct Args {
    /// Class prefix for generated scopes.
    #[arg(long, default_value = "me__", global = true)]
    prefix: String,

    /// Attribute that marks a style element as processed.
    #[arg(long, default_value = "ready", global = true)]
    marker: String,

    /// Warn about rewritten stylesheets that do not parse.
    #[arg(long, global = true)]
    check: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scope every inline style in one or more HTML files.
    Html {
        /// Input HTML files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the scoped files. Without it, a single input is
        /// printed to stdout.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Rewrite a plain CSS file with one scope.
    Css {
        /// Input CSS file.
        input: PathBuf,

        /// Scope number appended to the prefix.
        #[arg(long, default_value_t = 1)]
        scope: u64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // parse the args given in terminal
    let args = Args::parse();
    let config = ScopeConfig {
        prefix: args.prefix,
        marker: args.marker,
        check_css: args.check,
        ..ScopeConfig::default()
    };
    config.validate()?;

    match args.command {
        Command::Html { inputs, out_dir } => run_html(&inputs, out_dir.as_deref(), &config),
        Command::Css { input, scope } => run_css(&input, ScopeId::from(scope), &config),
    }
}

fn run_html(inputs: &[PathBuf], out_dir: Option<&Path>, config: &ScopeConfig) -> Result<()> {
    let Some(out_dir) = out_dir else {
        let [input] = inputs else {
            bail!("{} inputs given; use --out-dir to scope more than one file", inputs.len());
        };
        let html_content = fs::read_to_string(input)
            .with_context(|| format!("Error reading HTML file {}", input.display()))?;
        let scoped = scope_inline::generate(&html_content, config)?;
        return write_stdout(&scoped);
    };

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Error creating output directory {}", out_dir.display()))?;
    let jobs = inputs
        .iter()
        .map(|input| {
            let file_name = input
                .file_name()
                .with_context(|| format!("{} has no file name", input.display()))?;
            Ok(FileJob {
                input: input.clone(),
                output: out_dir.join(file_name),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let results = scope_inline::generate_files(&jobs, config);
    let mut failed = 0;
    for result in results {
        if let Err(err) = result {
            error!("{:#}", anyhow::Error::new(err));
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} files failed", jobs.len());
    }
    Ok(())
}

fn run_css(input: &Path, scope: ScopeId, config: &ScopeConfig) -> Result<()> {
    let css = fs::read_to_string(input)
        .with_context(|| format!("Error reading CSS file {}", input.display()))?;
    let class = scope.class_name(&config.prefix);
    let rewritten = CssRewriter::new(&config.prefix)?.rewrite(&css, &class);
    if config.check_css {
        if let Err(diagnostic) = check_stylesheet(&rewritten) {
            warn!("{}: stylesheet does not parse ({})", input.display(), diagnostic.message);
        }
    }
    write_stdout(&rewritten)
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Error writing to stdout")
}
