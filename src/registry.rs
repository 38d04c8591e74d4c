//! Реестр плагинов плеера
//!
//! Регистрация по имени идемпотентна: повторная регистрация того же имени ничего не делает.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::VttSnapshotOptions;
use crate::{HostContext, VttSnapshot};

/// Имя, под которым регистрируется плагин
pub const PLUGIN_NAME: &str = "vttSnapshot";

/// Фабрика экземпляров плагина
pub type PluginFactory = Arc<dyn Fn(HostContext, VttSnapshotOptions) -> Arc<VttSnapshot> + Send + Sync>;

/// Реестр плагинов хоста
pub trait PluginRegistry: Send + Sync {
    fn has(&self, name: &str) -> bool;

    /// Зарегистрировать фабрику; если имя уже занято, ничего не делает
    fn register(&self, name: &str, factory: PluginFactory);
}

/// Реестр плагинов в памяти
#[derive(Default)]
pub struct InMemoryPluginRegistry {
    factories: RwLock<HashMap<String, PluginFactory>>,
}

impl InMemoryPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Создать экземпляр зарегистрированного плагина
    pub fn create(
        &self,
        name: &str,
        host: HostContext,
        options: VttSnapshotOptions,
    ) -> Option<Arc<VttSnapshot>> {
        let factory = self.factories.read().get(name).cloned()?;
        Some(factory(host, options))
    }

    /// Имена зарегистрированных плагинов
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl PluginRegistry for InMemoryPluginRegistry {
    fn has(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    fn register(&self, name: &str, factory: PluginFactory) {
        self.factories
            .write()
            .entry(name.to_string())
            .or_insert(factory);
    }
}

/// Зарегистрировать плагин миниатюр в реестре хоста
///
/// Возвращает `false`, если плагин уже был зарегистрирован.
pub fn register_vtt_snapshot_plugin(registry: &dyn PluginRegistry) -> bool {
    if registry.has(PLUGIN_NAME) {
        log::debug!("Plugin '{}' is already registered", PLUGIN_NAME);
        return false;
    }

    registry.register(
        PLUGIN_NAME,
        Arc::new(|host: HostContext, options: VttSnapshotOptions| {
            Arc::new(VttSnapshot::new(host, options))
        }),
    );
    log::info!("Registered plugin '{}'", PLUGIN_NAME);
    true
}
