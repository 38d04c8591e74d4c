//! Модуль конфигурации плагина vtt-snapshot
//!
//! Содержит опции плагина и пользовательские хуки наведения.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VttSnapshotError};
use crate::snapshot::SnapshotData;

/// CSS класс элемента миниатюры по умолчанию
pub const DEFAULT_SNAPSHOT_CLASS: &str = "vjs-vtt-snapshot";

/// Преобразование данных миниатюры перед показом
///
/// `Some` заменяет данные, `None` оставляет их без изменений.
pub type Transform<T> = Arc<dyn Fn(T) -> Option<T> + Send + Sync>;

/// Уведомление о наведении
pub type HoverCallback = Arc<dyn Fn(&SnapshotData) + Send + Sync>;

/// Уведомление об уходе указателя с прогресс-бара
pub type LeaveCallback = Arc<dyn Fn() + Send + Sync>;

/// Пользовательские хуки наведения
#[derive(Clone, Default)]
pub struct HoverHooks {
    /// Вызывается перед показом; может заменить данные или подавить показ пустым `src`
    pub before_hovering: Option<Transform<SnapshotData>>,
    /// Вызывается при каждом обновлении миниатюры
    pub on_hover: Option<HoverCallback>,
    /// Вызывается, когда указатель покидает прогресс-бар
    pub on_leave: Option<LeaveCallback>,
}

impl fmt::Debug for HoverHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverHooks")
            .field("before_hovering", &self.before_hovering.is_some())
            .field("on_hover", &self.on_hover.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}

/// Конфигурация плагина
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VttSnapshotOptions {
    /// URL VTT файла с миниатюрами
    pub vtt_url: String,
    /// CSS класс элемента миниатюры
    pub snapshot_class: String,
    /// Инлайн-стили, применяемые после класса
    pub snapshot_style: BTreeMap<String, String>,
    /// Ширина миниатюры без спрайт-региона, px
    pub fallback_width: u32,
    /// Высота миниатюры без спрайт-региона, px
    pub fallback_height: u32,
    /// Зазор между миниатюрой и прогресс-баром, px
    pub vertical_gap: f64,
    /// Разрешать относительные URL изображений относительно `vtt_url`
    pub resolve_relative_urls: bool,
    /// Пользовательские хуки
    #[serde(skip)]
    pub hooks: HoverHooks,
}

impl Default for VttSnapshotOptions {
    fn default() -> Self {
        Self {
            vtt_url: String::new(),
            snapshot_class: DEFAULT_SNAPSHOT_CLASS.to_string(),
            snapshot_style: BTreeMap::new(),
            fallback_width: 160,
            fallback_height: 90,
            vertical_gap: 10.0,
            resolve_relative_urls: true,
            hooks: HoverHooks::default(),
        }
    }
}

impl VttSnapshotOptions {
    /// Создать опции для указанного VTT файла
    pub fn new(vtt_url: impl Into<String>) -> Self {
        Self {
            vtt_url: vtt_url.into(),
            ..Self::default()
        }
    }

    /// Загрузить опции из JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Проверить обязательные поля
    pub fn validate(&self) -> Result<()> {
        if self.vtt_url.trim().is_empty() {
            return Err(VttSnapshotError::Configuration(
                "vttUrl is required".to_string(),
            ));
        }
        if self.fallback_width == 0 || self.fallback_height == 0 {
            return Err(VttSnapshotError::Configuration(
                "fallbackWidth and fallbackHeight must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.snapshot_class = class.into();
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.snapshot_style.insert(property.into(), value.into());
        self
    }

    pub fn before_hovering<F>(mut self, hook: F) -> Self
    where
        F: Fn(SnapshotData) -> Option<SnapshotData> + Send + Sync + 'static,
    {
        self.hooks.before_hovering = Some(Arc::new(hook));
        self
    }

    pub fn on_hover<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SnapshotData) + Send + Sync + 'static,
    {
        self.hooks.on_hover = Some(Arc::new(hook));
        self
    }

    pub fn on_leave<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.on_leave = Some(Arc::new(hook));
        self
    }
}
