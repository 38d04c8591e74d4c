//! Модуль готовности плагина
//!
//! Явный автомат состояний `Uninitialized -> Initializing -> Ready | Failed` поверх
//! канала `tokio::sync::watch`. Все ожидающие получают один и тот же исход.
//! Из любого состояния возможен переход в конечное `Disposed`.

use tokio::sync::watch;

use crate::error::{Result, VttSnapshotError};

/// Состояние готовности
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyState {
    /// Инициализация ещё не начиналась
    Uninitialized,
    /// Загрузка и разбор VTT выполняются
    Initializing,
    /// Реплики загружены, обработчики подключены
    Ready,
    /// Инициализация завершилась ошибкой
    Failed(String),
    /// Плагин уничтожен
    Disposed,
}

impl ReadyState {
    /// Завершено ли ожидание (успехом или ошибкой)
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_) | Self::Disposed)
    }
}

/// Однократный сигнал готовности
pub struct ReadinessGate {
    tx: watch::Sender<ReadyState>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReadyState::Uninitialized);
        Self { tx }
    }

    /// Текущее состояние
    pub fn state(&self) -> ReadyState {
        self.tx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow() == ReadyState::Ready
    }

    /// Захватить право на инициализацию
    ///
    /// Возвращает guard ровно одному вызывающему. Если guard уничтожен без
    /// `resolve`/`fail` (например, future инициализации отменён), ворота
    /// переходят в `Failed`, и ожидающие не зависают.
    pub fn begin(&self) -> Option<InitGuard<'_>> {
        if self.try_begin() {
            Some(InitGuard {
                gate: self,
                settled: false,
            })
        } else {
            None
        }
    }

    fn try_begin(&self) -> bool {
        let mut claimed = false;
        self.tx.send_if_modified(|state| {
            if *state == ReadyState::Uninitialized {
                *state = ReadyState::Initializing;
                claimed = true;
            }
            claimed
        });
        claimed
    }

    /// Отметить успешное завершение инициализации
    pub fn resolve(&self) {
        self.settle(ReadyState::Ready);
    }

    /// Отметить неудачную инициализацию
    pub fn fail(&self, reason: impl Into<String>) {
        self.settle(ReadyState::Failed(reason.into()));
    }

    /// Перевести в конечное состояние `Disposed`
    pub fn dispose(&self) {
        self.tx.send_if_modified(|state| {
            if *state == ReadyState::Disposed {
                return false;
            }
            *state = ReadyState::Disposed;
            true
        });
    }

    /// Переход возможен только из незавершённого состояния
    fn settle(&self, outcome: ReadyState) {
        self.tx.send_if_modified(|state| {
            if state.is_settled() {
                return false;
            }
            *state = outcome;
            true
        });
    }

    /// Дождаться исхода инициализации
    pub async fn wait(&self) -> Result<()> {
        let mut rx = self.tx.subscribe();
        loop {
            let state = rx.borrow_and_update().clone();
            match state {
                ReadyState::Ready => return Ok(()),
                ReadyState::Failed(reason) => {
                    return Err(VttSnapshotError::InitializationFailed(reason))
                }
                ReadyState::Disposed => return Err(VttSnapshotError::Disposed),
                ReadyState::Uninitialized | ReadyState::Initializing => {}
            }
            if rx.changed().await.is_err() {
                return Err(VttSnapshotError::NotReady);
            }
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Право на завершение инициализации
pub struct InitGuard<'a> {
    gate: &'a ReadinessGate,
    settled: bool,
}

impl InitGuard<'_> {
    pub fn resolve(mut self) {
        self.settled = true;
        self.gate.resolve();
    }

    pub fn fail(mut self, reason: impl Into<String>) {
        self.settled = true;
        self.gate.fail(reason);
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("VTT snapshot initialization was cancelled before completion");
            self.gate.fail("initialization was cancelled");
        }
    }
}
