use std::path::PathBuf;

use anyhow::{bail, Context};
use medbridge::{
    config::{default_config_path, load_config},
    languages::{language_name, LANGUAGES},
    translation::PhrasebookTranslator,
    AudioInput, CannedTranslator, MicrophoneInput, RecognizerHandle, ScriptedRecognizer,
    SecurityHelper, SpeechFacade, TerminologyAnnotator, WavFileInput,
};
use tracing::info;

const USAGE: &str = "\
Usage: medbridge [--config <file>] <command>

Commands:
  annotate <lang> <text...>   mark medical terms in <text> for <lang>
  categories                  list term categories and their terms
  languages                   list supported languages
  headers                     print the HTTP security headers as JSON
  listen [--wav <file>] [--language <code>] [--target <lang>] [--dry-run]
                              recognize speech from the microphone or a WAV file";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("medbridge=info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("medbridge: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1).peekable();
    let mut config_path: Option<PathBuf> = None;

    while let Some(arg) = args.peek() {
        match arg.as_str() {
            "--config" => {
                args.next();
                let Some(v) = args.next() else {
                    bail!("missing value for --config");
                };
                config_path = Some(PathBuf::from(v));
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => break,
        }
    }

    let config_path = config_path.unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.apply_env_overrides();

    let Some(command) = args.next() else {
        bail!("missing command\n\n{USAGE}");
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "annotate" => {
            let Some((lang, words)) = rest.split_first() else {
                bail!("annotate needs <lang> <text...>");
            };
            if words.is_empty() {
                bail!("annotate needs <lang> <text...>");
            }
            let annotator = TerminologyAnnotator::new()?;
            println!("{}", annotator.annotate(&words.join(" "), lang));
        }
        "categories" => {
            let annotator = TerminologyAnnotator::new()?;
            for category in annotator.categories() {
                let terms: Vec<&str> = annotator
                    .terms_by_category(category)
                    .iter()
                    .map(|t| t.term.as_str())
                    .collect();
                println!("{category}: {}", terms.join(", "));
            }
        }
        "languages" => {
            for lang in LANGUAGES.iter() {
                let marker = if lang.medical_terms_support { "*" } else { " " };
                println!("{marker} {:<3} {:<12} {}", lang.code, lang.name, lang.native_name);
            }
        }
        "headers" => {
            let helper = SecurityHelper::new(config.security.clone());
            println!("{}", serde_json::to_string_pretty(&helper.security_headers())?);
        }
        "listen" => listen(config, &rest)?,
        other => bail!("unknown command: {other}\n\n{USAGE}"),
    }
    Ok(())
}

fn listen(mut config: medbridge::MedBridgeConfig, args: &[String]) -> anyhow::Result<()> {
    let mut wav: Option<PathBuf> = None;
    let mut target: Option<String> = None;
    let mut dry_run = false;

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--wav" => {
                let Some(v) = it.next() else {
                    bail!("missing value for --wav");
                };
                wav = Some(PathBuf::from(v));
            }
            "--language" => {
                let Some(v) = it.next() else {
                    bail!("missing value for --language");
                };
                config.speech.language = v.clone();
            }
            "--target" => {
                let Some(v) = it.next() else {
                    bail!("missing value for --target");
                };
                target = Some(v.clone());
            }
            "--dry-run" => dry_run = true,
            other => bail!("unknown argument: {other}"),
        }
    }

    let input: Box<dyn AudioInput> = match wav {
        Some(path) => Box::new(WavFileInput::new(path, config.speech.clone())),
        None => Box::new(MicrophoneInput::new(config.speech.clone())),
    };
    let recognizer = if dry_run {
        RecognizerHandle::new(ScriptedRecognizer::from_texts([
            "I have a fever",
            "The patient reports chest pain and high blood pressure",
            "I need help",
        ]))
    } else {
        web_recognizer(&config)?
    };

    let facade = SpeechFacade::new(&config.speech, input, recognizer)
        .with_translator(PhrasebookTranslator::new(CannedTranslator));
    let annotator = TerminologyAnnotator::new()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("building translation runtime")?;

    if let Some(target) = &target {
        info!(target = target.as_str(), name = language_name(target), "translating results");
    }

    facade.start_recognition(
        |text| {
            println!("> {text}");
            let Some(target) = &target else {
                return;
            };
            match runtime.block_on(facade.translate(&text, target)) {
                Ok(translated) => println!("  {translated}"),
                Err(e) => eprintln!("  translation failed: {e}"),
            }
            println!("  {}", annotator.annotate(&text, target));
        },
        |e| eprintln!("recognition error: {e}"),
    );
    Ok(())
}

#[cfg(feature = "web-recognizer")]
fn web_recognizer(config: &medbridge::MedBridgeConfig) -> anyhow::Result<RecognizerHandle> {
    Ok(RecognizerHandle::new(medbridge::WebSpeechRecognizer::new(
        &config.recognizer,
    )?))
}

#[cfg(not(feature = "web-recognizer"))]
fn web_recognizer(_config: &medbridge::MedBridgeConfig) -> anyhow::Result<RecognizerHandle> {
    bail!("built without the web-recognizer feature; use --dry-run")
}
