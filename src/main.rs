//! Command-line front end: render a WAV file's visualizer frame to PNG.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use wavescope::config::{self, VisualizerSettings};
use wavescope::decode::WavDecoder;
use wavescope::logging::{self, LogFile, LogOptions};
use wavescope::render::VisualizationMode;
use wavescope::scheduler::ManualFrameClock;
use wavescope::surface::RasterSurface;
use wavescope::transport::{ClockTransport, SharedTransport, Transport, TransportEvent};
use wavescope::visualizer::WaveformVisualizer;

#[derive(Parser, Debug)]
#[command(name = "wavescope")]
#[command(about = "Render waveform and spectrum frames of a WAV file")]
struct Args {
    /// WAV file to visualize
    input: PathBuf,

    /// PNG file to write
    #[arg(short, long)]
    output: PathBuf,

    /// Live frame content
    #[arg(long, value_enum, default_value = "waveform")]
    mode: ModeArg,

    /// Playhead position in seconds
    #[arg(long, default_value = "0")]
    at: f64,

    /// Surface width in CSS pixels
    #[arg(long, default_value = "1200")]
    width: u32,

    /// Surface height in CSS pixels
    #[arg(long, default_value = "360")]
    height: u32,

    /// Device pixel ratio
    #[arg(long, default_value = "1")]
    dpr: f32,

    /// Render one live frame as if playing instead of the static envelope
    #[arg(long)]
    live: bool,

    /// Settings file; defaults to the application config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// More diagnostics; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write diagnostics to a file; without a path, a run log in the app folder
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,
}

impl Args {
    fn log_options(&self) -> LogOptions {
        LogOptions {
            verbosity: self.verbose,
            file: self
                .log_file
                .clone()
                .map(|path| path.map_or(LogFile::RunLog, LogFile::At)),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Waveform,
    Spectrum,
}

impl From<ModeArg> for VisualizationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Waveform => VisualizationMode::Waveform,
            ModeArg::Spectrum => VisualizationMode::Spectrum,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let options = args.log_options();
    let log = match logging::init(&options) {
        Ok(handle) => handle,
        Err(err) => {
            let handle = logging::init(&LogOptions {
                file: None,
                ..options
            })?;
            tracing::warn!("File logging disabled: {err}");
            handle
        }
    };
    if let Some(path) = log.file() {
        tracing::info!("Logging to {}", path.display());
    }

    let settings = load_settings(args.config.as_ref());
    let bytes = std::fs::read(&args.input)?;

    let clock = Rc::new(RefCell::new(ManualFrameClock::new()));
    let clock_transport = Rc::new(RefCell::new(ClockTransport::new(0.0)));
    let transport: SharedTransport = clock_transport.clone();
    let mut visualizer = WaveformVisualizer::new(
        settings,
        RasterSurface::new(),
        transport,
        Box::new(Rc::clone(&clock)),
    );
    visualizer.on_resize(args.width, args.height, args.dpr);
    visualizer.on_mode_change(args.mode.into());
    visualizer.load_bytes(&bytes, &WavDecoder)?;

    let duration = visualizer
        .samples()
        .map(|samples| samples.duration())
        .unwrap_or(0.0);
    clock_transport.borrow_mut().set_duration(duration);
    visualizer.on_transport_event(TransportEvent::LoadedMetadata);

    clock_transport.borrow_mut().seek(args.at);
    visualizer.on_transport_event(TransportEvent::TimeUpdate);

    if args.live {
        visualizer.on_play_toggle();
        clock_transport.borrow_mut().seek(args.at);
        let token = clock.borrow_mut().next_due();
        match token.and_then(|token| visualizer.on_frame(token)) {
            Some(report) => tracing::info!("Rendered {:?} frame", report.kind),
            None => tracing::warn!("No live frame was rendered"),
        }
    }

    if visualizer.last_frame().is_none() {
        return Err(format!(
            "surface {}x{} leaves no room for the chart",
            args.width, args.height
        )
        .into());
    }
    visualizer.surface().save_png(&args.output)?;
    visualizer.on_teardown();
    Ok(())
}

fn load_settings(path: Option<&PathBuf>) -> VisualizerSettings {
    let loaded = match path {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    };
    loaded.unwrap_or_else(|err| {
        tracing::warn!("Using default settings: {err}");
        VisualizerSettings::default()
    })
}
