//! Утилита для проверки VTT дорожки миниатюр
//!
//! Использование: `vtt-inspect <путь или URL> [время в секундах]`
//!
//! Без времени печатает все реплики дорожки. Со временем показывает, какая
//! миниатюра будет выбрана при наведении на эту точку.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use vtt_snapshot::snapshot::{compute_placement, parse_vtt_cue, resolve_src};
use vtt_snapshot::vtt::{find_closest_cue, format_time, load_cues};
use vtt_snapshot::{FileTextFetcher, HttpTextFetcher, TextFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Инициализируем логирование
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let source = match args.next() {
        Some(source) => source,
        None => bail!("usage: vtt-inspect <path-or-url> [time-seconds]"),
    };
    let time = args
        .next()
        .map(|t| t.parse::<f64>())
        .transpose()
        .context("time must be a number of seconds")?;

    let fetcher: Arc<dyn TextFetcher> =
        if source.starts_with("http://") || source.starts_with("https://") {
            Arc::new(HttpTextFetcher::new())
        } else {
            Arc::new(FileTextFetcher)
        };

    let text = fetcher
        .fetch_text(&source)
        .await
        .with_context(|| format!("failed to load {}", source))?;
    let cues = load_cues(&text);

    let Some(time) = time else {
        println!("{} cues in {}", cues.len(), source);
        for cue in cues.iter() {
            println!(
                "{} --> {}  {}",
                format_time(cue.start_time),
                format_time(cue.end_time),
                cue.text.replace('\n', " ")
            );
        }
        return Ok(());
    };

    let Some(cue) = find_closest_cue(&cues, time) else {
        println!("No cues in {}", source);
        return Ok(());
    };

    let descriptor = parse_vtt_cue(cue);
    let mut data = compute_placement(&descriptor, time);
    if !data.src.is_empty() {
        data.src = resolve_src(&source, &data.src);
    }

    println!("time:  {} ({:.3}s)", format_time(time), time);
    println!(
        "cue:   {} --> {}",
        format_time(cue.start_time),
        format_time(cue.end_time)
    );
    if data.src.is_empty() {
        println!("image: <none>");
    } else if data.is_cropped() {
        println!(
            "image: {} region {}x{} at ({}, {})",
            data.src, data.w, data.h, data.x, data.y
        );
    } else {
        println!("image: {}", data.src);
    }

    Ok(())
}
