//! Модуль для построения миниатюры
//!
//! Разбор текста реплики и вычисление геометрии элемента миниатюры.

pub mod descriptor;
pub mod geometry;

pub use descriptor::{parse_payload, parse_vtt_cue, resolve_src, SpriteRegion, ThumbnailDescriptor};
pub use geometry::{
    clamp_left, compute_layout, compute_placement, hover_time, ProgressBarMetrics, SnapshotData,
    SnapshotLayout,
};
