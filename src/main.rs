use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_transcript::cli::{Cli, Commands, OutputFormat};
use yt_transcript::{FsCache, TranscriptClient, TranscriptConfig, TranscriptSegment};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "yt_transcript=debug"
    } else {
        "yt_transcript=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Fetch {
            video,
            lang,
            format,
            timestamps,
            http,
            user_agent,
            cache_dir,
            cache_ttl,
        } => {
            let mut config = TranscriptConfig::new();
            config.lang = lang;
            config.user_agent = user_agent;
            config.disable_https = http;
            if cache_dir.is_some() || cache_ttl.is_some() {
                let dir = cache_dir.unwrap_or_else(FsCache::default_dir);
                config.cache = Some(Arc::new(FsCache::new(dir)));
                config.cache_ttl = cache_ttl.map(Duration::from_secs);
            }

            let client = TranscriptClient::new(config);
            let segments = client.fetch_transcript(&video).await?;

            match format {
                OutputFormat::Text => print_text(&segments, timestamps),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&segments)?),
                OutputFormat::Srt => print!("{}", format_srt(&segments)),
            }
        }
        Commands::Check { video, lang } => {
            let mut config = TranscriptConfig::new();
            config.lang = lang;

            let availability = TranscriptClient::new(config)
                .check_transcript_availability(&video)
                .await?;

            println!("video:     {}", availability.video_id);
            println!("available: {}", availability.available);
            if let Some(selected) = &availability.selected_language {
                println!("language:  {selected}");
            }
            println!("languages: {}", availability.available_languages.join(", "));
        }
        Commands::Languages { video } => {
            let availability = TranscriptClient::new(TranscriptConfig::new())
                .check_transcript_availability(&video)
                .await?;
            for lang in availability.available_languages {
                println!("{lang}");
            }
        }
    }

    Ok(())
}

fn print_text(segments: &[TranscriptSegment], timestamps: bool) {
    for segment in segments {
        if timestamps {
            println!("[{}] {}", srt_timestamp(segment.offset), segment.text);
        } else {
            println!("{}", segment.text);
        }
    }
}

fn format_srt(segments: &[TranscriptSegment]) -> String {
    let mut out = String::new();
    for (index, segment) in segments.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            srt_timestamp(segment.offset),
            srt_timestamp(segment.offset + segment.duration),
            segment.text,
        ));
    }
    out
}

fn srt_timestamp(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        millis / 3_600_000,
        millis / 60_000 % 60,
        millis / 1000 % 60,
        millis % 1000
    )
}
