//! Модуль для парсинга VTT дорожки миниатюр
//!
//! Парсер тотален: битые блоки пропускаются, корректные сохраняются в исходном порядке.

use lazy_static::lazy_static;
use regex::Regex;

use crate::vtt::timestamp::parse_timestamp;

lazy_static! {
    /// Строка тайминга: `start --> end [настройки]`
    static ref TIMING_LINE: Regex = Regex::new(r"^\s*(\S+)\s+-->\s+(\S+)(?:\s+.*)?$").unwrap();
}

/// Реплика VTT дорожки
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Идентификатор реплики, если он был указан
    pub id: Option<String>,
    /// Время начала в секундах
    pub start_time: f64,
    /// Время окончания в секундах
    pub end_time: f64,
    /// Сырой текст реплики (URL изображения и, возможно, `#xywh=`)
    pub text: String,
}

impl Cue {
    /// Создать новый экземпляр Cue
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            id: None,
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Середина интервала реплики
    pub fn midpoint(&self) -> f64 {
        (self.start_time + self.end_time) / 2.0
    }

    /// Попадает ли время в полуинтервал `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time
    }
}

/// Парсинг VTT текста в список реплик
pub fn parse_vtt(raw: &str) -> Vec<Cue> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut cues = Vec::new();
    let mut current_block: Vec<&str> = Vec::new();
    let mut block_index = 0;

    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !current_block.is_empty() {
                if let Some(cue) = parse_cue_block(&current_block, block_index) {
                    cues.push(cue);
                }
                block_index += 1;
                current_block.clear();
            }
        } else {
            current_block.push(line);
        }
    }

    // Обрабатываем последний блок, если он есть
    if !current_block.is_empty() {
        if let Some(cue) = parse_cue_block(&current_block, block_index) {
            cues.push(cue);
        }
    }

    cues
}

/// Парсинг и сортировка реплик по времени начала
///
/// Сортировка стабильная: реплики с равным началом сохраняют порядок файла.
pub fn load_cues(raw: &str) -> Vec<Cue> {
    let mut cues = parse_vtt(raw);

    let sorted = cues
        .windows(2)
        .all(|pair| pair[0].start_time <= pair[1].start_time);
    if !sorted {
        log::warn!("VTT cues are not ordered by start time, sorting {} cues", cues.len());
        cues.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }

    cues
}

/// Парсинг блока реплики
fn parse_cue_block(lines: &[&str], block_index: usize) -> Option<Cue> {
    let first = lines.first()?.trim_start();

    // Заголовок и служебные блоки
    if block_index == 0 && first.starts_with("WEBVTT") {
        return None;
    }
    if ["NOTE", "STYLE", "REGION"]
        .iter()
        .any(|keyword| first == *keyword || first.starts_with(&format!("{} ", keyword)))
    {
        return None;
    }

    // Строка тайминга идёт первой или сразу после идентификатора
    let (id, timing_index) = if lines[0].contains("-->") {
        (None, 0)
    } else if lines.len() > 1 && lines[1].contains("-->") {
        (Some(lines[0].trim().to_string()), 1)
    } else {
        log::debug!("Skipping VTT block #{}: no timing line", block_index);
        return None;
    };

    let captures = TIMING_LINE.captures(lines[timing_index])?;
    let start_time = parse_timestamp(&captures[1]);
    let end_time = parse_timestamp(&captures[2]);

    let (start_time, end_time) = match (start_time, end_time) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => {
            log::debug!(
                "Skipping VTT block #{}: invalid timing '{}'",
                block_index,
                lines[timing_index].trim()
            );
            return None;
        }
    };

    let text = lines[timing_index + 1..]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n");

    Some(Cue {
        id,
        start_time,
        end_time,
        text,
    })
}
