//! Основной файл библиотеки vtt-snapshot
//!
//! Библиотека показывает миниатюру кадра над прогресс-баром видеоплеера при наведении,
//! используя WebVTT дорожку, которая сопоставляет интервалы времени URL изображений
//! (в том числе регионам спрайт-листа).

pub mod config;
pub mod error;
pub mod host;
pub mod readiness;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod vtt;


use std::sync::Arc;

pub use crate::config::{HoverHooks, Transform, VttSnapshotOptions, DEFAULT_SNAPSHOT_CLASS};
pub use crate::error::{Result, VttSnapshotError};
pub use crate::host::{
    FileTextFetcher, FrameScheduler, HttpTextFetcher, ManualFrameScheduler, Player, PointerEvent,
    PointerListener, ProgressBar, SnapshotElement, TextFetcher, TokioFrameScheduler,
};
pub use crate::readiness::{InitGuard, ReadinessGate, ReadyState};
pub use crate::registry::{
    register_vtt_snapshot_plugin, InMemoryPluginRegistry, PluginRegistry, PLUGIN_NAME,
};
pub use crate::session::{HoverPhase, HoverSession};
pub use crate::snapshot::{ProgressBarMetrics, SnapshotData, SnapshotLayout, ThumbnailDescriptor};
pub use crate::vtt::Cue;

/// Возможности хоста, нужные плагину
#[derive(Clone)]
pub struct HostContext {
    /// Плеер с прогресс-баром
    pub player: Arc<dyn Player>,
    /// Загрузка текста VTT
    pub fetcher: Arc<dyn TextFetcher>,
    /// Планировщик кадров
    pub scheduler: Arc<dyn FrameScheduler>,
}

impl HostContext {
    pub fn new(
        player: Arc<dyn Player>,
        fetcher: Arc<dyn TextFetcher>,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> Self {
        Self {
            player,
            fetcher,
            scheduler,
        }
    }
}

/// Плагин миниатюр для одного плеера
pub struct VttSnapshot {
    player: Arc<dyn Player>,
    fetcher: Arc<dyn TextFetcher>,
    options: VttSnapshotOptions,
    session: Arc<HoverSession>,
    gate: ReadinessGate,
}

impl VttSnapshot {
    /// Создать плагин; загрузка начнётся при первом вызове [`VttSnapshot::ready`]
    pub fn new(host: HostContext, options: VttSnapshotOptions) -> Self {
        let session = HoverSession::new(host.player.clone(), host.scheduler, options.clone());
        Self {
            player: host.player,
            fetcher: host.fetcher,
            options,
            session,
            gate: ReadinessGate::new(),
        }
    }

    /// Дождаться готовности плагина
    ///
    /// Первый вызов выполняет инициализацию, остальные ждут её исхода. Все вызовы
    /// получают один и тот же результат. Если future первого вызова отменён до
    /// завершения, инициализация считается неудачной.
    pub async fn ready(&self) -> Result<()> {
        if let Some(init) = self.gate.begin() {
            match self.initialize().await {
                Ok(()) => init.resolve(),
                Err(e) => {
                    log::error!("VTT snapshot initialization failed: {}", e);
                    init.fail(e.to_string());
                }
            }
        }
        self.gate.wait().await
    }

    /// Загрузка VTT и подключение к прогресс-бару
    async fn initialize(&self) -> Result<()> {
        self.options.validate()?;

        // Проверяем цель до загрузки, чтобы не подписываться на несуществующий элемент
        let progress_bar = self
            .player
            .progress_bar()
            .ok_or(VttSnapshotError::ProgressBarMissing)?;
        if !progress_bar.is_interactable() {
            return Err(VttSnapshotError::ProgressBarNotInteractable);
        }

        let text = self
            .fetcher
            .fetch_text(&self.options.vtt_url)
            .await
            .map_err(|e| {
                log::warn!("Failed to fetch {}: {}", self.options.vtt_url, e);
                match e {
                    VttSnapshotError::Fetch(_) => e,
                    other => VttSnapshotError::Fetch(other.to_string()),
                }
            })?;

        let cues = vtt::load_cues(&text);
        log::info!(
            "Loaded {} thumbnail cues from {}",
            cues.len(),
            self.options.vtt_url
        );

        self.session.attach(cues, progress_bar)
    }

    pub fn state(&self) -> ReadyState {
        self.gate.state()
    }

    pub fn options(&self) -> &VttSnapshotOptions {
        &self.options
    }

    /// Контроллер сеанса наведения
    pub fn session(&self) -> &Arc<HoverSession> {
        &self.session
    }

    /// Загруженные реплики (пусто до готовности или после ошибки загрузки)
    pub fn cues(&self) -> Arc<[Cue]> {
        self.session.cues()
    }

    pub fn handle_pointer_move(&self, event: PointerEvent) -> Result<()> {
        self.session.handle_pointer_move(event)
    }

    pub fn handle_pointer_leave(&self) -> Result<()> {
        self.session.handle_pointer_leave()
    }

    /// Уничтожить плагин; повторный вызов ничего не делает
    pub fn dispose(&self) {
        self.session.dispose();
        self.gate.dispose();
    }
}

impl Drop for VttSnapshot {
    fn drop(&mut self) {
        self.dispose();
    }
}
