use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use story_consent::services::{InMemoryStore, RecordingActions, StaticBackground};
use story_consent::{BackgroundSample, BuildOptions, ConsentPrompt, ConsentSource, Rgb};

/// Build a story consent prompt and print its render plan as JSON
#[derive(Parser, Debug)]
#[command(name = "story-consent", version, about)]
struct Args {
    /// HTML document containing an <amp-story-consent>, or a JSON config with --json
    file: PathBuf,

    /// Treat FILE as the raw JSON configuration
    #[arg(long)]
    json: bool,

    /// Consent container id (required with --json, overrides the markup otherwise)
    #[arg(long)]
    consent_id: Option<String>,

    /// Computed background color behind the prompt
    #[arg(long, default_value = "rgb(0, 0, 0)")]
    background: String,

    /// Page color translucent backgrounds are composited over
    #[arg(long, default_value = "rgb(255, 255, 255)")]
    canvas: String,

    /// Namespace the consent actions are allowlisted under
    #[arg(long, default_value = "AMP-CONSENT")]
    namespace: String,
}

fn read_source(args: &Args) -> anyhow::Result<ConsentSource> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut source = if args.json {
        ConsentSource {
            config_json: Some(text),
            consent_id: None,
        }
    } else {
        from_markup(&text)?
    };
    if let Some(id) = &args.consent_id {
        source.consent_id = Some(id.clone());
    }
    Ok(source)
}

#[cfg(feature = "markup")]
fn from_markup(html: &str) -> anyhow::Result<ConsentSource> {
    Ok(story_consent::markup::extract(html)?)
}

#[cfg(not(feature = "markup"))]
fn from_markup(_html: &str) -> anyhow::Result<ConsentSource> {
    bail!("HTML input requires the `markup` feature; pass --json instead")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json && args.consent_id.is_none() {
        bail!("--consent-id is required with --json");
    }

    let canvas: BackgroundSample = args
        .canvas
        .parse()
        .with_context(|| format!("invalid --canvas {:?}", args.canvas))?;
    let options = BuildOptions {
        canvas: canvas.composite_over(Rgb::WHITE),
        allowlist_namespace: args.namespace.clone(),
        ..Default::default()
    };

    let source = read_source(&args)?;
    let actions = Arc::new(RecordingActions::new());
    let mut prompt =
        ConsentPrompt::with_options(Arc::new(InMemoryStore::new()), actions.clone(), options);
    let plan = prompt
        .build(&source, &StaticBackground::new(args.background.clone()))
        .context("failed to build consent prompt")?;

    let out = serde_json::json!({
        "plan": plan,
        "allowlist": actions.allowlist(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
