use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use bookvox::app::{ReaderApp, run_app};
use bookvox::assets::AssetCache;
use bookvox::event_source::TerminalEventSource;
use bookvox::loader::DocumentLoader;
use bookvox::panic_handler;
use bookvox::recognize::{OcrEngine, OcrService, TesseractOcr, UnavailableOcr};
use bookvox::select::RegionProcessor;
use bookvox::settings::Settings;
use bookvox::speech::{NullSpeech, ProcessSpeech, SpeechSynth};

#[derive(Parser, Debug)]
#[command(name = "bookvox", about = "A terminal document reader that reads selected regions aloud")]
struct Cli {
    /// PDF, image, or plain-text file to open
    file: Option<PathBuf>,

    /// Download any missing OCR language models and exit
    #[arg(long)]
    fetch_assets: bool,

    /// Log file path
    #[arg(long, default_value = "bookvox.log")]
    log_file: PathBuf,
}

fn build_ocr(settings: &Settings, cache: Option<&AssetCache>) -> Box<dyn OcrEngine> {
    let tessdata = cache.and_then(|c| {
        let dir = c.version_dir();
        dir.is_dir().then_some(dir)
    });
    match TesseractOcr::detect(&settings.ocr_languages, tessdata) {
        Some(engine) => Box::new(engine),
        None => {
            warn!("tesseract not found; selections will produce no text");
            Box::new(UnavailableOcr)
        }
    }
}

fn build_speech() -> Box<dyn SpeechSynth> {
    match ProcessSpeech::detect() {
        Some(speech) => Box::new(speech),
        None => {
            warn!("no TTS backend found; speech disabled");
            Box::new(NullSpeech)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        LevelFilter::Info,
        Config::default(),
        File::create(&cli.log_file)?,
    )?;

    let settings = Settings::load();

    let cache = settings
        .cache_dir
        .clone()
        .or_else(AssetCache::default_root)
        .map(AssetCache::new);

    if cli.fetch_assets {
        match &cache {
            Some(cache) => {
                let dir = cache.ensure_ocr_models()?;
                println!("OCR models cached in {}", dir.display());
            }
            None => anyhow::bail!("no cache directory available on this platform"),
        }
        return Ok(());
    }

    let processor = RegionProcessor::new(
        OcrService::spawn(build_ocr(&settings, cache.as_ref())),
        build_speech(),
    )
    .with_voice_locale(settings.voice_locale.clone());
    let loader = DocumentLoader::new(settings.render_scale);
    let mut app = ReaderApp::new(loader, processor);

    panic_handler::initialize_panic_handler();
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let size = terminal.size()?;
    app.set_viewport(size.width, size.height);

    if let Some(file) = &cli.file {
        if let Err(e) = app.open_file(file) {
            warn!("failed to open {}: {e:#}", file.display());
        }
    }

    info!("bookvox started");
    let result = run_app(&mut terminal, &mut app, &mut TerminalEventSource);

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    result
}
