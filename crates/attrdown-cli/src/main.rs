use anyhow::{Context, Result, bail};
use attrdown_config::{Config, RenderSettings};
use attrdown_engine::{HtmlGenerator, IoError, Outline, RenderOptions, io};
use clap::{CommandFactory, Parser, error::ErrorKind};
use relative_path::RelativePath;
use std::path::{Path, PathBuf};

/// Render a directory of Markdown documents with attribute lists to HTML
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the `.md` files to render
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Directory the `.html` files are written to
    #[arg(long)]
    destination_dir: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long)]
    overwrite: bool,

    /// Also write `<name>.outline.json` with the heading outline
    #[arg(long)]
    outline: bool,

    /// Config file to use instead of ~/.config/attrdown/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Command-line flags layered over the config file.
#[derive(Debug)]
struct Settings {
    source_dir: PathBuf,
    destination_dir: PathBuf,
    overwrite: bool,
    write_outline: bool,
    render: RenderOptions,
}

impl Settings {
    fn resolve(args: Args, config: Config) -> Result<Self, clap::Error> {
        let missing = |flag: &str| {
            Args::command().error(
                ErrorKind::MissingRequiredArgument,
                format!("{flag} was not given and is not set in the config file"),
            )
        };
        let source_dir = args
            .source_dir
            .or(config.source_dir)
            .ok_or_else(|| missing("--source-dir"))?;
        let destination_dir = args
            .destination_dir
            .or(config.destination_dir)
            .ok_or_else(|| missing("--destination-dir"))?;

        Ok(Self {
            source_dir,
            destination_dir,
            overwrite: args.overwrite || config.overwrite,
            write_outline: args.outline || config.write_outline,
            render: render_options(&config.render),
        })
    }
}

fn render_options(settings: &RenderSettings) -> RenderOptions {
    RenderOptions {
        tables: settings.tables,
        footnotes: settings.footnotes,
        definition_lists: settings.definition_lists,
        strikethrough: settings.strikethrough,
        highlight: settings.highlight,
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, config) = match path {
        Some(path) => (path.to_path_buf(), Config::load_from_path(path)),
        None => (Config::config_path(), Config::load()),
    };
    match config.with_context(|| format!("Failed to load config file '{}'", path.display()))? {
        Some(config) => {
            log::debug!("using config file '{}'", path.display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let settings = Settings::resolve(args, config).unwrap_or_else(|e| e.exit());

    run(&settings)
}

fn run(settings: &Settings) -> Result<()> {
    io::validate_dir(&settings.source_dir).context("Invalid --source-dir")?;
    io::validate_dir(&settings.destination_dir).context("Invalid --destination-dir")?;

    let files = io::scan_markdown_files(&settings.source_dir)?;
    log::info!(
        "rendering {} documents from '{}'",
        files.len(),
        settings.source_dir.display()
    );

    let generator = HtmlGenerator::new(settings.render);
    let mut failed = 0usize;
    for file in &files {
        if let Err(e) = convert(&generator, settings, file) {
            log::error!("{file}: {e:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} documents failed", files.len());
    }
    log::info!(
        "wrote {} documents to '{}'",
        files.len(),
        settings.destination_dir.display()
    );
    Ok(())
}

fn convert(generator: &HtmlGenerator, settings: &Settings, file: &RelativePath) -> Result<()> {
    let markdown = io::read_file(file, &settings.source_dir)
        .with_context(|| format!("Failed to read {file}"))?;

    let mut outline = Outline::new();
    let rendered = generator
        .generate(&markdown, &mut [&mut outline])
        .with_context(|| format!("Failed to render {file}"))?;

    write_output(settings, &io::output_path(file, "html"), &rendered.html)?;
    if settings.write_outline {
        let json = serde_json::to_string_pretty(&outline.tree())?;
        write_output(settings, &io::output_path(file, "outline.json"), &json)?;
    }

    log::debug!("{file}: {} headings", outline.entries().len());
    Ok(())
}

fn write_output(settings: &Settings, path: &RelativePath, content: &str) -> Result<()> {
    match io::write_file(path, &settings.destination_dir, content, settings.overwrite) {
        Err(e @ IoError::AlreadyExists(_)) => {
            Err(anyhow::Error::new(e).context("Pass --overwrite to replace existing files"))
        }
        other => other.with_context(|| format!("Failed to write {path}")),
    }
}
