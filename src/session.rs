//! Модуль управления сеансом наведения
//!
//! Движения указателя только запоминают последнее событие и планируют не более
//! одного кадра. Вся тяжёлая работа (поиск реплики, геометрия, хуки, отрисовка)
//! выполняется в кадре и использует самую свежую позицию указателя.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::config::VttSnapshotOptions;
use crate::error::{Result, VttSnapshotError};
use crate::host::{
    FrameHandle, FrameScheduler, ListenerId, Player, PointerEvent, PointerListener, ProgressBar,
    SnapshotElement,
};
use crate::snapshot::{
    compute_layout, compute_placement, hover_time, parse_vtt_cue, resolve_src, SnapshotData,
    SnapshotLayout,
};
use crate::vtt::{Cue, CueTrack};

/// Фаза сеанса наведения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPhase {
    /// Обработчики ещё не подключены
    Detached,
    /// Указатель не над прогресс-баром или миниатюра скрыта
    Idle,
    /// Запланирован кадр
    Pending,
    /// Миниатюра показана
    Displaying,
    /// Сеанс уничтожен
    Disposed,
}

struct HoverState {
    phase: HoverPhase,
    last_event: Option<PointerEvent>,
    /// Кадр запрошен и ещё не выполнен
    frame_requested: bool,
    pending_frame: Option<FrameHandle>,
    cues: Arc<CueTrack>,
    progress_bar: Option<Arc<dyn ProgressBar>>,
    listener_id: Option<ListenerId>,
}

/// Контроллер сеанса наведения
pub struct HoverSession {
    player: Arc<dyn Player>,
    scheduler: Arc<dyn FrameScheduler>,
    options: VttSnapshotOptions,
    state: Mutex<HoverState>,
    element: Mutex<Option<Box<dyn SnapshotElement>>>,
    self_ref: Weak<HoverSession>,
}

impl HoverSession {
    pub fn new(
        player: Arc<dyn Player>,
        scheduler: Arc<dyn FrameScheduler>,
        options: VttSnapshotOptions,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            player,
            scheduler,
            options,
            state: Mutex::new(HoverState {
                phase: HoverPhase::Detached,
                last_event: None,
                frame_requested: false,
                pending_frame: None,
                cues: Arc::new(CueTrack::default()),
                progress_bar: None,
                listener_id: None,
            }),
            element: Mutex::new(None),
            self_ref: self_ref.clone(),
        })
    }

    /// Подключить сеанс к прогресс-бару
    ///
    /// Создаёт скрытый элемент миниатюры с классом и стилями из опций и подписывается
    /// на события указателя.
    pub fn attach(&self, cues: Vec<Cue>, progress_bar: Arc<dyn ProgressBar>) -> Result<()> {
        if self.phase() == HoverPhase::Disposed {
            return Err(VttSnapshotError::Disposed);
        }

        let mut element = progress_bar.create_snapshot_element()?;
        element.set_class(&self.options.snapshot_class);
        element.apply_style(&self.options.snapshot_style);
        element.hide();

        let listener: Arc<dyn PointerListener> = Arc::new(SessionListener {
            session: self.self_ref.clone(),
        });

        let listener_id = progress_bar.add_pointer_listener(listener);

        let mut state = self.state.lock();
        if state.phase != HoverPhase::Detached {
            // Уничтожен во время создания элемента или подключён повторно
            drop(state);
            progress_bar.remove_pointer_listener(listener_id);
            element.remove();
            return Err(VttSnapshotError::Disposed);
        }
        *self.element.lock() = Some(element);
        state.listener_id = Some(listener_id);
        state.cues = Arc::new(CueTrack::new(cues));
        state.progress_bar = Some(progress_bar);
        state.phase = HoverPhase::Idle;

        Ok(())
    }

    pub fn phase(&self) -> HoverPhase {
        self.state.lock().phase
    }

    /// Загруженные реплики
    pub fn cues(&self) -> Arc<[Cue]> {
        self.state.lock().cues.cues().clone()
    }

    /// Обработать движение указателя
    ///
    /// До подключения возвращает `NotReady`; после уничтожения ничего не делает.
    pub fn handle_pointer_move(&self, event: PointerEvent) -> Result<()> {
        {
            let mut state = self.state.lock();
            match state.phase {
                HoverPhase::Detached => return Err(VttSnapshotError::NotReady),
                HoverPhase::Disposed => return Ok(()),
                _ => {}
            }

            state.last_event = Some(event);
            if state.frame_requested {
                return Ok(());
            }
            state.frame_requested = true;
            state.phase = HoverPhase::Pending;
        }

        let session = self.self_ref.clone();
        let handle = self.scheduler.request_frame(Box::new(move || {
            if let Some(session) = session.upgrade() {
                session.run_frame();
            }
        }));

        let mut state = self.state.lock();
        if state.frame_requested && state.pending_frame.is_none() {
            state.pending_frame = Some(handle);
        }
        Ok(())
    }

    /// Обработать уход указателя с прогресс-бара
    pub fn handle_pointer_leave(&self) -> Result<()> {
        let pending = {
            let mut state = self.state.lock();
            match state.phase {
                HoverPhase::Detached => return Err(VttSnapshotError::NotReady),
                HoverPhase::Disposed => return Ok(()),
                _ => {}
            }
            state.frame_requested = false;
            state.last_event = None;
            state.phase = HoverPhase::Idle;
            state.pending_frame.take()
        };

        if let Some(handle) = pending {
            self.scheduler.cancel_frame(handle);
        }
        self.hide_element();

        if let Some(on_leave) = &self.options.hooks.on_leave {
            if panic::catch_unwind(AssertUnwindSafe(|| on_leave())).is_err() {
                log::warn!("onLeave hook panicked");
            }
        }
        Ok(())
    }

    /// Работа кадра
    fn run_frame(&self) {
        let (event, cues, progress_bar) = {
            let mut state = self.state.lock();
            if !state.frame_requested || state.phase == HoverPhase::Disposed {
                return;
            }
            state.frame_requested = false;
            state.pending_frame = None;
            match (state.last_event, state.progress_bar.clone()) {
                (Some(event), Some(progress_bar)) => (event, state.cues.clone(), progress_bar),
                _ => return,
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.render(event, &cues, progress_bar.as_ref())
        }))
        .unwrap_or_else(|_| Err(VttSnapshotError::Host("hover hook panicked".to_string())));

        let shown = match outcome {
            Ok(shown) => shown,
            Err(e) => {
                log::warn!("Failed to update snapshot, hiding it: {}", e);
                false
            }
        };

        let mut state = self.state.lock();
        if state.phase != HoverPhase::Pending {
            // Указатель ушёл или сеанс уничтожен, пока шёл кадр
            drop(state);
            self.hide_element();
            return;
        }
        if shown {
            state.phase = HoverPhase::Displaying;
        } else {
            state.phase = HoverPhase::Idle;
            drop(state);
            self.hide_element();
        }
    }

    /// Вычисление и отрисовка миниатюры; `Ok(false)`, если показывать нечего
    fn render(
        &self,
        event: PointerEvent,
        track: &CueTrack,
        progress_bar: &dyn ProgressBar,
    ) -> Result<bool> {
        let metrics = progress_bar.metrics();
        let time = hover_time(&metrics, event.client_x, self.player.duration());

        let cue = match track.find(time) {
            Some(cue) => cue,
            None => return Ok(false),
        };

        let descriptor = parse_vtt_cue(cue);
        let mut data = compute_placement(&descriptor, time);
        if self.options.resolve_relative_urls {
            data.src = resolve_src(&self.options.vtt_url, &data.src);
        }

        let data = self.before_hovering(data);
        if data.src.is_empty() {
            log::debug!("No snapshot for {:.3}s", time);
            return Ok(false);
        }

        if let Some(on_hover) = &self.options.hooks.on_hover {
            on_hover(&data);
        }

        let layout = compute_layout(&data, &metrics, event.client_x, &self.options);
        log::debug!(
            "Snapshot at {:.3}s: {} ({}x{} at {:.1})",
            time,
            data.src,
            layout.width,
            layout.height,
            layout.left
        );

        self.show_element(&data, &layout)
    }

    /// Показ через хост без удержания блокировки элемента
    ///
    /// `show` может синхронно вызвать уход указателя или уничтожение сеанса; на
    /// время вызова элемент вынимается, поэтому `hide_element` его не увидит, и
    /// скрытие выполнит `run_frame` по изменившейся фазе.
    fn show_element(&self, data: &SnapshotData, layout: &SnapshotLayout) -> Result<bool> {
        let mut element = match self.element.lock().take() {
            Some(element) => element,
            None => return Ok(false),
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| element.show(data, layout)))
            .unwrap_or_else(|_| {
                Err(VttSnapshotError::Host("snapshot element panicked".to_string()))
            });

        let state = self.state.lock();
        if state.phase == HoverPhase::Disposed {
            drop(state);
            element.remove();
            return Ok(false);
        }
        *self.element.lock() = Some(element);
        drop(state);

        result.map(|()| true)
    }

    fn before_hovering(&self, data: SnapshotData) -> SnapshotData {
        match &self.options.hooks.before_hovering {
            Some(transform) => {
                let original = data.clone();
                transform(data).unwrap_or(original)
            }
            None => data,
        }
    }

    fn hide_element(&self) {
        if let Some(element) = self.element.lock().as_mut() {
            element.hide();
        }
    }

    /// Уничтожить сеанс: отменить кадр, отписаться и удалить элемент
    ///
    /// Повторный вызов ничего не делает.
    pub fn dispose(&self) {
        let (pending, progress_bar, listener_id) = {
            let mut state = self.state.lock();
            if state.phase == HoverPhase::Disposed {
                return;
            }
            state.phase = HoverPhase::Disposed;
            state.frame_requested = false;
            state.last_event = None;
            (
                state.pending_frame.take(),
                state.progress_bar.take(),
                state.listener_id.take(),
            )
        };

        if let Some(handle) = pending {
            self.scheduler.cancel_frame(handle);
        }
        if let (Some(progress_bar), Some(id)) = (progress_bar, listener_id) {
            progress_bar.remove_pointer_listener(id);
        }
        if let Some(mut element) = self.element.lock().take() {
            element.remove();
        }

        log::info!("VTT snapshot session disposed");
    }
}

/// Подписка сеанса на события прогресс-бара
struct SessionListener {
    session: Weak<HoverSession>,
}

impl PointerListener for SessionListener {
    fn on_pointer_move(&self, event: PointerEvent) {
        if let Some(session) = self.session.upgrade() {
            if let Err(e) = session.handle_pointer_move(event) {
                log::debug!("Pointer move ignored: {}", e);
            }
        }
    }

    fn on_pointer_leave(&self) {
        if let Some(session) = self.session.upgrade() {
            if let Err(e) = session.handle_pointer_leave() {
                log::debug!("Pointer leave ignored: {}", e);
            }
        }
    }
}
