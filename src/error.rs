//! Модуль обработки ошибок библиотеки vtt-snapshot
//!
//! Ошибки отдельных реплик сюда не попадают: парсер пропускает их молча.
//! Наружу выходят только структурные ошибки (загрузка, цель в DOM, конфигурация).

use thiserror::Error;

/// Ошибки библиотеки vtt-snapshot
#[derive(Debug, Error)]
pub enum VttSnapshotError {
    /// Ошибка HTTP запроса
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Не удалось получить текст VTT
    #[error("Failed to fetch VTT: {0}")]
    Fetch(String),

    /// Ошибка конфигурации
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// У плеера нет прогресс-бара
    #[error("Progress bar not found")]
    ProgressBarMissing,

    /// Прогресс-бар есть, но с ним нельзя взаимодействовать
    #[error("Progress bar is not interactable")]
    ProgressBarNotInteractable,

    /// Ошибка на стороне хоста (создание элемента, применение стилей)
    #[error("Host error: {0}")]
    Host(String),

    /// Операция вызвана до завершения инициализации
    #[error("Plugin is not ready yet")]
    NotReady,

    /// Инициализация завершилась ошибкой
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Плагин уже уничтожен
    #[error("Plugin has been disposed")]
    Disposed,
}

/// Тип Result для библиотеки vtt-snapshot
pub type Result<T> = std::result::Result<T, VttSnapshotError>;
