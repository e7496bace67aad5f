use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vadscribe::audio::source::FrameSource;
use vadscribe::audio::wav::WavFrameSource;
use vadscribe::cli::{Cli, Commands};
use vadscribe::config::Config;
use vadscribe::stt::backend::BackendConfig;
use vadscribe::stt::whisper::WhisperBackend;
use vadscribe::transcript::{CollectorSink, StdoutSink, TranscriptSink};
use vadscribe::vad::classifier::{EnergyClassifier, SpeechClassifier};
use vadscribe::{Session, SessionHandle};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_transcribe(config, &cli)?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/vadscribe/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else if let Some(default_path) = Config::default_path() {
        Config::load_or_default(&default_path)?
    } else {
        Config::default()
    };

    Ok(config.with_env_overrides())
}

/// Run the capture → segment → transcribe pipeline until the input ends.
fn run_transcribe(mut config: Config, cli: &Cli) -> Result<()> {
    if let Some(model) = &cli.model {
        config.stt.model = model.clone();
    }
    if let Some(language) = &cli.language {
        config.stt.language = language.clone();
    }
    if let Some(device) = &cli.device {
        config.audio.device = Some(device.clone());
    }

    let source = build_source(cli.wav.as_deref(), config.audio.device.as_deref())?;
    let source_is_finite = source.is_finite();
    let classifier = build_classifier(cli, &config)?;

    let backend = Arc::new(WhisperBackend::new(BackendConfig {
        model_path: resolve_model_path(&config.stt.model),
        language: config.stt.language.clone(),
        threads: None,
    })?);

    let sink: Box<dyn TranscriptSink> = if cli.quiet {
        Box::new(CollectorSink::new())
    } else if cli.verbose >= 1 {
        Box::new(StdoutSink::verbose())
    } else {
        Box::new(StdoutSink::new())
    };

    let mut handle = Session::new(config)
        .with_verbose(cli.verbose >= 2)
        .start(source, classifier, backend, sink)?;

    if source_is_finite {
        wait_for_capture(&handle);
    } else {
        if !cli.quiet {
            eprintln!("Recording... press Enter to stop");
        }
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    }

    let result = handle.stop();
    if cli.quiet {
        if let Some(text) = result {
            println!("{}", text);
        }
    }

    Ok(())
}

/// Pick the frame source: a WAV file when given, the microphone otherwise.
fn build_source(
    wav: Option<&Path>,
    device: Option<&str>,
) -> Result<Box<dyn FrameSource>> {
    if let Some(path) = wav {
        return Ok(Box::new(WavFrameSource::from_path(path)?));
    }

    #[cfg(feature = "capture")]
    {
        let source = vadscribe::audio::capture::CpalFrameSource::new(device)?;
        Ok(Box::new(source))
    }

    #[cfg(not(feature = "capture"))]
    {
        let _ = device;
        bail!(
            "this binary was built without microphone capture; \
             rebuild with --features capture or pass --wav <FILE>"
        );
    }
}

fn build_classifier(cli: &Cli, config: &Config) -> Result<Box<dyn SpeechClassifier>> {
    match cli.vad.as_str() {
        "energy" => Ok(Box::new(EnergyClassifier::new(
            config.segmenter.energy_threshold,
        ))),
        "webrtc" => {
            #[cfg(feature = "webrtc")]
            {
                let classifier = vadscribe::vad::webrtc::WebRtcClassifier::new(
                    config.audio.sample_rate,
                    cli.vad_aggressiveness,
                )?;
                Ok(Box::new(classifier))
            }
            #[cfg(not(feature = "webrtc"))]
            {
                bail!("this binary was built without the webrtc feature; use --vad energy");
            }
        }
        other => bail!("unknown classifier '{other}' (expected: energy, webrtc)"),
    }
}

/// Map a model name to its on-disk path.
///
/// Anything that looks like a path (contains a separator or exists as a
/// file) is used verbatim; bare names like `base` resolve to
/// `~/.local/share/vadscribe/models/ggml-<name>.bin`.
fn resolve_model_path(model: &str) -> PathBuf {
    let as_path = PathBuf::from(model);
    if model.contains(std::path::MAIN_SEPARATOR) || as_path.exists() {
        return as_path;
    }

    match dirs::data_dir() {
        Some(dir) => dir
            .join("vadscribe")
            .join("models")
            .join(format!("ggml-{model}.bin")),
        None => as_path,
    }
}

/// Block until the capture thread has flushed its final segment.
fn wait_for_capture(handle: &SessionHandle) {
    while !handle.capture_finished() {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}

/// List available audio input devices.
#[cfg(feature = "capture")]
fn list_audio_devices() -> Result<()> {
    let devices = vadscribe::audio::capture::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

#[cfg(not(feature = "capture"))]
fn list_audio_devices() -> Result<()> {
    bail!("this binary was built without microphone capture; rebuild with --features capture")
}
