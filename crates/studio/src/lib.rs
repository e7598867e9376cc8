//! Command-line ad studio for a Reelsmith service.
//!
//! The library half ([`client::StudioClient`]) talks to the HTTP API; this
//! module wires it to `clap` subcommands.

pub mod client;
pub mod error;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use reelsmith_core::script::AdBrief;
use reelsmith_core::task::TaskStatus;

use crate::client::{choose_prompt_image, StudioClient, VideoRequest, DEFAULT_SERVICE_URL};
pub use crate::error::{Result, StudioError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reelsmith ad studio", long_about = None)]
pub struct Cli {
    /// Base URL of the Reelsmith service
    #[arg(long, env = "REELSMITH_URL", default_value = DEFAULT_SERVICE_URL)]
    pub url: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the voiceover script for a brief
    Script(BriefArgs),
    /// Synthesize the script to an MP3 file
    Voice(VoiceArgs),
    /// Upload an image and print its public URL
    Upload(UploadArgs),
    /// Generate a video and print its URL
    Video(VideoArgs),
    /// Script, voiceover, optional upload and video in one go
    Make(MakeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct BriefArgs {
    #[arg(long, default_value = "")]
    pub product: String,
    #[arg(long, default_value = "")]
    pub audience: String,
    #[arg(long, default_value = "")]
    pub goal: String,
    /// Visual direction notes
    #[arg(long, default_value = "")]
    pub visual: String,
    /// Call to action
    #[arg(long, default_value = "")]
    pub cta: String,
}

impl From<BriefArgs> for AdBrief {
    fn from(args: BriefArgs) -> Self {
        AdBrief {
            product: args.product,
            audience: args.audience,
            goal: args.goal,
            visual: args.visual,
            cta: args.cta,
        }
    }
}

#[derive(Args, Debug)]
pub struct VoiceArgs {
    #[command(flatten)]
    pub brief: BriefArgs,
    /// Text to speak instead of the generated script
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long, default_value = "alloy")]
    pub voice: String,
    #[arg(long, default_value = "voiceover.mp3")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Image file to upload
    pub path: PathBuf,
    /// Content type (guessed from the extension when omitted)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct VideoOptions {
    /// Aspect ratio token or label, e.g. `720:1280` or `YouTube (16:9)`
    #[arg(long, default_value = "720:1280")]
    pub ratio: String,
    /// Clip length in seconds
    #[arg(long, default_value = "5")]
    pub duration: String,
    #[arg(long, default_value = "gen4_turbo")]
    pub model: String,
    /// Local seed image, uploaded first
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Seed image URL, used when no local image is given
    #[arg(long)]
    pub image_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct VideoArgs {
    #[command(flatten)]
    pub brief: BriefArgs,
    /// Prompt text instead of the generated script
    #[arg(long)]
    pub prompt: Option<String>,
    #[command(flatten)]
    pub options: VideoOptions,
}

#[derive(Args, Debug)]
pub struct MakeArgs {
    #[command(flatten)]
    pub brief: BriefArgs,
    #[arg(long, default_value = "alloy")]
    pub voice: String,
    /// Directory receiving `voiceover.mp3`
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    #[command(flatten)]
    pub options: VideoOptions,
}

pub async fn run(cli: Cli) -> Result<()> {
    let client = StudioClient::new(&cli.url)?;

    match cli.command {
        Commands::Script(brief) => {
            println!("{}", client.script(&brief.into()));
        }
        Commands::Voice(args) => {
            let text = args
                .text
                .unwrap_or_else(|| client.script(&args.brief.into()));
            write_voiceover(&client, &text, &args.voice, &args.out).await?;
            println!("{}", args.out.display());
        }
        Commands::Upload(args) => {
            let url = upload_file(&client, &args.path, args.content_type.as_deref()).await?;
            println!("{url}");
        }
        Commands::Video(args) => {
            let prompt = args
                .prompt
                .unwrap_or_else(|| client.script(&args.brief.into()));
            let url = generate_video(&client, prompt, &args.options).await?;
            println!("{url}");
        }
        Commands::Make(args) => {
            let script = client.script(&args.brief.into());
            eprintln!("Script ready.");
            println!("{script}\n");

            let audio_path = args.out_dir.join("voiceover.mp3");
            write_voiceover(&client, &script, &args.voice, &audio_path).await?;
            eprintln!("Voiceover ready: {}", audio_path.display());

            let url = generate_video(&client, script, &args.options).await?;
            println!("{url}");
        }
    }

    Ok(())
}

async fn write_voiceover(client: &StudioClient, text: &str, voice: &str, out: &Path) -> Result<()> {
    eprintln!("Generating voiceover...");
    let audio = client.voiceover(text, voice).await?;
    tokio::fs::write(out, &audio).await?;
    Ok(())
}

async fn upload_file(
    client: &StudioClient,
    path: &Path,
    content_type: Option<&str>,
) -> Result<String> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let content_type = content_type.unwrap_or_else(|| guess_content_type(path));
    let body = tokio::fs::read(path).await?;

    eprintln!("Uploading {filename}...");
    client.upload(&filename, content_type, body).await
}

async fn generate_video(
    client: &StudioClient,
    prompt_text: String,
    options: &VideoOptions,
) -> Result<String> {
    let uploaded = match &options.image {
        Some(path) => Some(upload_file(client, path, None).await?),
        None => None,
    };

    let request = VideoRequest {
        prompt_image: choose_prompt_image(uploaded.as_deref(), options.image_url.as_deref()),
        ratio: options.ratio.clone(),
        duration: options.duration.clone(),
        model: options.model.clone(),
        ..VideoRequest::new(prompt_text)
    };

    eprintln!("Starting video...");
    let task_id = client.start_video(&request).await?;

    let mut previous: Option<TaskStatus> = None;
    let url = client
        .wait_for_video(&task_id, |status| {
            if previous != Some(status) {
                eprintln!("Video status: {status}");
                previous = Some(status);
            }
        })
        .await?;

    eprintln!("Video ready.");
    Ok(url)
}

/// Content type for common image extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_is_guessed_from_extension() {
        assert_eq!(guess_content_type(Path::new("a/b.PNG")), "image/png");
        assert_eq!(guess_content_type(Path::new("shot.jpeg")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn cli_reads_subcommands() {
        let cli = Cli::try_parse_from([
            "reelsmith-studio",
            "--url",
            "http://svc:8080",
            "video",
            "--product",
            "Shoes",
            "--ratio",
            "Square",
            "--image-url",
            "https://ref/x.png",
        ])
        .unwrap();

        assert_eq!(cli.url, "http://svc:8080");
        match cli.command {
            Commands::Video(args) => {
                assert_eq!(args.brief.product, "Shoes");
                assert_eq!(args.options.ratio, "Square");
                assert_eq!(args.options.duration, "5");
                assert_eq!(args.options.image_url.as_deref(), Some("https://ref/x.png"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn brief_args_convert_to_brief() {
        let brief: AdBrief = BriefArgs {
            product: "P".into(),
            cta: "Go".into(),
            ..BriefArgs::default()
        }
        .into();
        assert_eq!(brief.product, "P");
        assert_eq!(brief.cta, "Go");
        assert!(brief.goal.is_empty());
    }
}
