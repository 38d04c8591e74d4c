//! Геометрия миниатюры над прогресс-баром
//!
//! Координаты `SnapshotLayout` задаются относительно левого верхнего угла прогресс-бара.

use serde::{Deserialize, Serialize};

use crate::config::VttSnapshotOptions;
use crate::snapshot::descriptor::ThumbnailDescriptor;
use crate::vtt::format_time;

/// Данные миниатюры, передаваемые в хуки
///
/// `x, y, w, h`: прямоугольник обрезки спрайта; нули означают "всё изображение".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotData {
    /// Время наведения в секундах
    pub time: f64,
    pub src: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl SnapshotData {
    /// Задан ли прямоугольник обрезки
    pub fn is_cropped(&self) -> bool {
        self.w > 0 && self.h > 0
    }
}

/// Габариты прогресс-бара в клиентских координатах
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressBarMetrics {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ProgressBarMetrics {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Итоговое размещение элемента миниатюры
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLayout {
    /// Смещение слева относительно прогресс-бара
    pub left: f64,
    /// Смещение сверху относительно прогресс-бара (отрицательное значение означает "над ним")
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Смещение фонового изображения для обрезки спрайта
    pub background_x: f64,
    pub background_y: f64,
    /// Подпись со временем наведения
    pub label: String,
}

/// Данные миниатюры для реплики и времени наведения
pub fn compute_placement(descriptor: &ThumbnailDescriptor, time: f64) -> SnapshotData {
    let (x, y, w, h) = descriptor
        .region
        .map(|r| (r.x, r.y, r.w, r.h))
        .unwrap_or((0, 0, 0, 0));

    SnapshotData {
        time,
        src: descriptor.src.clone(),
        x,
        y,
        w,
        h,
    }
}

/// Время под указателем
///
/// Доля позиции указателя внутри прогресс-бара, ограниченная `[0, 1]`, умноженная
/// на длительность. Для бара нулевой ширины или некорректной длительности возвращается 0.
pub fn hover_time(metrics: &ProgressBarMetrics, pointer_x: f64, duration: f64) -> f64 {
    if metrics.width <= 0.0 || !duration.is_finite() || duration <= 0.0 || !pointer_x.is_finite() {
        return 0.0;
    }
    let ratio = ((pointer_x - metrics.left) / metrics.width).clamp(0.0, 1.0);
    ratio * duration
}

/// Горизонтальная позиция миниатюры шириной `width` с центром под указателем
///
/// `pointer_offset` отсчитывается от левого края бара. Миниатюра не выходит за его
/// границы; если она шире бара, прижимается к левому краю.
pub fn clamp_left(pointer_offset: f64, width: f64, bar_width: f64) -> f64 {
    let max_left = (bar_width - width).max(0.0);
    (pointer_offset - width / 2.0).clamp(0.0, max_left)
}

/// Размещение элемента миниатюры над прогресс-баром
pub fn compute_layout(
    data: &SnapshotData,
    metrics: &ProgressBarMetrics,
    pointer_x: f64,
    options: &VttSnapshotOptions,
) -> SnapshotLayout {
    let (width, height, background_x, background_y) = if data.is_cropped() {
        (data.w as f64, data.h as f64, -(data.x as f64), -(data.y as f64))
    } else {
        (options.fallback_width as f64, options.fallback_height as f64, 0.0, 0.0)
    };

    SnapshotLayout {
        left: clamp_left(pointer_x - metrics.left, width, metrics.width),
        top: -(height + options.vertical_gap),
        width,
        height,
        background_x,
        background_y,
        label: format_time(data.time),
    }
}
