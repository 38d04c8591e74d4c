//! Тестовый хост: плеер, прогресс-бар и элемент, записывающие все вызовы

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Result, VttSnapshotError};
use crate::host::{
    ListenerId, ManualFrameScheduler, Player, PointerEvent, PointerListener, ProgressBar,
    SnapshotElement, TextFetcher,
};
use crate::snapshot::{ProgressBarMetrics, SnapshotData, SnapshotLayout};
use crate::{HostContext, VttSnapshot, VttSnapshotOptions};

/// Спрайт 4x1, кадры 120x68, дорожка на 20 секунд
pub const SAMPLE_VTT: &str = "WEBVTT

1
00:00:00.000 --> 00:00:05.000
sprite.jpg#xywh=0,0,120,68

2
00:00:05.000 --> 00:00:10.000
sprite.jpg#xywh=120,0,120,68

3
00:00:10.000 --> 00:00:15.000
sprite.jpg#xywh=240,0,120,68

4
00:00:15.000 --> 00:00:20.000
sprite.jpg#xywh=360,0,120,68
";

/// Вызовы элемента миниатюры
#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    Class(String),
    Style(BTreeMap<String, String>),
    Show(SnapshotData, SnapshotLayout),
    Hide,
    Remove,
}

/// Действие хоста, выполняемое синхронно внутри `show`
pub type ShowReaction = Arc<dyn Fn() + Send + Sync>;

pub struct RecordingElement {
    log: Arc<Mutex<Vec<ElementEvent>>>,
    fail_show: Arc<AtomicBool>,
    on_show: Arc<Mutex<Option<ShowReaction>>>,
}

impl SnapshotElement for RecordingElement {
    fn set_class(&mut self, class: &str) {
        self.log.lock().push(ElementEvent::Class(class.to_string()));
    }

    fn apply_style(&mut self, style: &BTreeMap<String, String>) {
        self.log.lock().push(ElementEvent::Style(style.clone()));
    }

    fn show(&mut self, data: &SnapshotData, layout: &SnapshotLayout) -> Result<()> {
        if self.fail_show.load(Ordering::SeqCst) {
            return Err(VttSnapshotError::Host("image failed to load".to_string()));
        }
        self.log
            .lock()
            .push(ElementEvent::Show(data.clone(), layout.clone()));
        let reaction = self.on_show.lock().clone();
        if let Some(reaction) = reaction {
            reaction();
        }
        Ok(())
    }

    fn hide(&mut self) {
        self.log.lock().push(ElementEvent::Hide);
    }

    fn remove(&mut self) {
        self.log.lock().push(ElementEvent::Remove);
    }
}

pub struct MockProgressBar {
    metrics: ProgressBarMetrics,
    interactable: bool,
    listeners: Mutex<HashMap<ListenerId, Arc<dyn PointerListener>>>,
    next_id: AtomicUsize,
    elements_created: AtomicUsize,
    log: Arc<Mutex<Vec<ElementEvent>>>,
    fail_show: Arc<AtomicBool>,
    on_show: Arc<Mutex<Option<ShowReaction>>>,
}

impl MockProgressBar {
    pub fn new(width: f64) -> Self {
        Self::with_interactable(width, true)
    }

    pub fn with_interactable(width: f64, interactable: bool) -> Self {
        Self {
            metrics: ProgressBarMetrics::new(0.0, 400.0, width, 8.0),
            interactable,
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
            elements_created: AtomicUsize::new(0),
            log: Arc::new(Mutex::new(Vec::new())),
            fail_show: Arc::new(AtomicBool::new(false)),
            on_show: Arc::new(Mutex::new(None)),
        }
    }

    /// Движение указателя, как его отправил бы браузер
    pub fn move_pointer(&self, x: f64) {
        let listeners: Vec<_> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener.on_pointer_move(PointerEvent::new(x, 404.0));
        }
    }

    pub fn leave(&self) {
        let listeners: Vec<_> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener.on_pointer_leave();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn elements_created(&self) -> usize {
        self.elements_created.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<ElementEvent> {
        self.log.lock().clone()
    }

    pub fn clear_events(&self) {
        self.log.lock().clear();
    }

    /// Все показанные миниатюры
    pub fn shown(&self) -> Vec<(SnapshotData, SnapshotLayout)> {
        self.log
            .lock()
            .iter()
            .filter_map(|event| match event {
                ElementEvent::Show(data, layout) => Some((data.clone(), layout.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, expected: &ElementEvent) -> usize {
        self.log.lock().iter().filter(|e| *e == expected).count()
    }

    pub fn set_fail_show(&self, fail: bool) {
        self.fail_show.store(fail, Ordering::SeqCst);
    }

    /// Выполнять `reaction` изнутри каждого `show`
    pub fn set_on_show<F>(&self, reaction: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_show.lock() = Some(Arc::new(reaction));
    }

    pub fn last_event(&self) -> Option<ElementEvent> {
        self.log.lock().last().cloned()
    }
}

impl ProgressBar for MockProgressBar {
    fn metrics(&self) -> ProgressBarMetrics {
        self.metrics
    }

    fn is_interactable(&self) -> bool {
        self.interactable
    }

    fn create_snapshot_element(&self) -> Result<Box<dyn SnapshotElement>> {
        self.elements_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingElement {
            log: self.log.clone(),
            fail_show: self.fail_show.clone(),
            on_show: self.on_show.clone(),
        }))
    }

    fn add_pointer_listener(&self, listener: Arc<dyn PointerListener>) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().insert(id, listener);
        id
    }

    fn remove_pointer_listener(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }
}

pub struct MockPlayer {
    pub duration: f64,
    pub progress_bar: Option<Arc<MockProgressBar>>,
}

impl Player for MockPlayer {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn progress_bar(&self) -> Option<Arc<dyn ProgressBar>> {
        self.progress_bar
            .clone()
            .map(|bar| bar as Arc<dyn ProgressBar>)
    }
}

/// Отдаёт заранее заданный текст или ошибку
pub struct StaticFetcher {
    text: Option<String>,
    hang: bool,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            hang: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            hang: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Загрузка, которая никогда не завершается
    pub fn hanging() -> Self {
        Self {
            text: None,
            hang: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextFetcher for StaticFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
        self.text
            .clone()
            .ok_or_else(|| VttSnapshotError::Fetch(format!("HTTP 404 for {}", url)))
    }
}

/// Связка тестового хоста
pub struct Harness {
    pub bar: Arc<MockProgressBar>,
    pub fetcher: Arc<StaticFetcher>,
    pub scheduler: Arc<ManualFrameScheduler>,
    pub host: HostContext,
}

impl Harness {
    pub fn new(vtt: &str) -> Self {
        Self::build(StaticFetcher::new(vtt), Some(MockProgressBar::new(500.0)))
    }

    pub fn build(fetcher: StaticFetcher, bar: Option<MockProgressBar>) -> Self {
        let bar = bar.map(Arc::new);
        let fetcher = Arc::new(fetcher);
        let scheduler = Arc::new(ManualFrameScheduler::new());
        let player = Arc::new(MockPlayer {
            duration: 20.0,
            progress_bar: bar.clone(),
        });
        let host = HostContext::new(player, fetcher.clone(), scheduler.clone());

        Self {
            bar: bar.unwrap_or_else(|| Arc::new(MockProgressBar::new(500.0))),
            fetcher,
            scheduler,
            host,
        }
    }

    pub fn plugin(&self, options: VttSnapshotOptions) -> VttSnapshot {
        VttSnapshot::new(self.host.clone(), options)
    }

    /// Плагин, уже прошедший инициализацию
    pub async fn ready_plugin(&self, options: VttSnapshotOptions) -> VttSnapshot {
        let plugin = self.plugin(options);
        plugin.ready().await.unwrap();
        plugin
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
