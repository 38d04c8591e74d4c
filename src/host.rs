//! Модуль с интерфейсами хоста
//!
//! Плеер, прогресс-бар, элемент миниатюры, загрузка текста и планировщик кадров
//! описаны трейтами, чтобы ядро не зависело от конкретного окружения.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::error::{Result, VttSnapshotError};
use crate::snapshot::{ProgressBarMetrics, SnapshotData, SnapshotLayout};

/// Идентификатор подписки на события указателя
pub type ListenerId = usize;

/// Идентификатор запланированного кадра
pub type FrameHandle = u64;

/// Отложенная работа кадра
pub type FrameCallback = Box<dyn FnOnce() + Send + 'static>;

/// Событие указателя в клиентских координатах
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Загрузка текста VTT по URL
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Медиаплеер хоста
pub trait Player: Send + Sync {
    /// Текущая длительность в секундах
    fn duration(&self) -> f64;

    /// Прогресс-бар плеера, если он есть
    fn progress_bar(&self) -> Option<Arc<dyn ProgressBar>>;
}

/// Подписчик на события указателя над прогресс-баром
pub trait PointerListener: Send + Sync {
    fn on_pointer_move(&self, event: PointerEvent);
    fn on_pointer_leave(&self);
}

/// Прогресс-бар плеера
pub trait ProgressBar: Send + Sync {
    /// Габариты в клиентских координатах
    fn metrics(&self) -> ProgressBarMetrics;

    /// Присутствует ли в DOM и принимает ли события указателя
    fn is_interactable(&self) -> bool;

    /// Создать элемент миниатюры внутри прогресс-бара
    fn create_snapshot_element(&self) -> Result<Box<dyn SnapshotElement>>;

    fn add_pointer_listener(&self, listener: Arc<dyn PointerListener>) -> ListenerId;

    fn remove_pointer_listener(&self, id: ListenerId);
}

/// Элемент, отображающий миниатюру
pub trait SnapshotElement: Send {
    fn set_class(&mut self, class: &str);

    /// Применить инлайн-стили поверх класса
    fn apply_style(&mut self, style: &BTreeMap<String, String>);

    fn show(&mut self, data: &SnapshotData, layout: &SnapshotLayout) -> Result<()>;

    fn hide(&mut self);

    /// Удалить элемент из DOM
    fn remove(&mut self);
}

/// Планировщик "один отложенный вызов на кадр"
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Отмена кадра, который ещё не выполнился; для выполненного ничего не делает
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Загрузка VTT по HTTP
pub struct HttpTextFetcher {
    client: reqwest::Client,
}

impl HttpTextFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTextFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextFetcher for HttpTextFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        log::debug!("Fetching VTT from {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Чтение VTT из локального файла (`file://` префикс допускается)
#[derive(Debug, Default)]
pub struct FileTextFetcher;

#[async_trait]
impl TextFetcher for FileTextFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if tokio::fs::metadata(path).await.is_err() {
            return Err(VttSnapshotError::Fetch(format!(
                "VTT file not found: {}",
                path.display()
            )));
        }
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Планировщик с ручным "тиком"
///
/// Кадры копятся в очереди и выполняются вызовом [`ManualFrameScheduler::tick`].
pub struct ManualFrameScheduler {
    queue: Mutex<Vec<(FrameHandle, FrameCallback)>>,
    next_handle: AtomicU64,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Выполнить все запланированные кадры; возвращает их количество
    pub fn tick(&self) -> usize {
        // Кадры, запрошенные во время тика, попадут в следующий
        let frames = std::mem::take(&mut *self.queue.lock());
        let count = frames.len();
        for (_, callback) in frames {
            callback();
        }
        count
    }

    /// Количество ожидающих кадров
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl Default for ManualFrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.queue.lock().retain(|(queued, _)| *queued != handle);
    }
}

/// Планировщик кадров на таймерах Tokio (~60 Гц)
pub struct TokioFrameScheduler {
    runtime: tokio::runtime::Handle,
    frame_interval: Duration,
    tasks: Arc<Mutex<HashMap<FrameHandle, JoinHandle<()>>>>,
    next_handle: AtomicU64,
}

impl TokioFrameScheduler {
    /// Создать планировщик в текущем рантайме Tokio
    pub fn new() -> Result<Self> {
        Self::with_interval(Duration::from_millis(16))
    }

    pub fn with_interval(frame_interval: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| VttSnapshotError::Host(format!("No Tokio runtime: {}", e)))?;
        Ok(Self {
            runtime,
            frame_interval,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_handle: AtomicU64::new(1),
        })
    }
}

impl FrameScheduler for TokioFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let tasks = self.tasks.clone();
        let interval = self.frame_interval;

        // Блокировка держится до вставки, чтобы задача не удалила себя раньше
        let mut guard = self.tasks.lock();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(interval).await;
            if tasks.lock().remove(&handle).is_some() {
                callback();
            }
        });
        guard.insert(handle, task);
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        if let Some(task) = self.tasks.lock().remove(&handle) {
            task.abort();
        }
    }
}
