//! Модуль для работы с VTT дорожкой миниатюр
//!
//! Парсинг временных меток, разбор реплик и поиск реплики по времени.

pub mod parser;
pub mod resolver;
pub mod timestamp;

pub use parser::{load_cues, parse_vtt, Cue};
pub use resolver::{find_closest_cue, CueTrack};
pub use timestamp::{format_time, parse_timestamp};
