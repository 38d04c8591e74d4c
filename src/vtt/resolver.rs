//! Поиск реплики по времени наведения
//!
//! [`CueTrack`] один раз при загрузке строит вспомогательные массивы, после чего
//! каждый поиск сводится к бинарному поиску и проверке соседей.

use std::sync::Arc;

use crate::vtt::parser::Cue;

/// Загруженная дорожка с индексом для поиска по времени
///
/// Реплики должны быть отсортированы по `start_time` (см. [`crate::vtt::load_cues`]).
#[derive(Debug, Clone)]
pub struct CueTrack {
    cues: Arc<[Cue]>,
    index: CueIndex,
}

impl CueTrack {
    pub fn new(cues: Vec<Cue>) -> Self {
        let cues: Arc<[Cue]> = Arc::from(cues);
        let index = CueIndex::build(&cues);
        Self { cues, index }
    }

    pub fn cues(&self) -> &Arc<[Cue]> {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Реплика для времени наведения, см. [`find_closest_cue`]
    pub fn find(&self, time: f64) -> Option<&Cue> {
        self.index.locate(&self.cues, time).map(|i| &self.cues[i])
    }
}

impl Default for CueTrack {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, Default)]
struct CueIndex {
    /// Максимум `end_time` среди `cues[..=i]`
    max_end: Vec<f64>,
    /// Реплика с наибольшей серединой среди `cues[..=i]` (первая при равенстве)
    best_before: Vec<usize>,
    /// Реплика с наименьшей серединой среди `cues[i..]` (первая при равенстве)
    best_after: Vec<usize>,
}

impl CueIndex {
    fn build(cues: &[Cue]) -> Self {
        let n = cues.len();
        let mut max_end: Vec<f64> = Vec::with_capacity(n);
        let mut best_before: Vec<usize> = Vec::with_capacity(n);
        let mut best_after = vec![0; n];

        for (i, cue) in cues.iter().enumerate() {
            match i.checked_sub(1) {
                Some(prev) => {
                    max_end.push(max_end[prev].max(cue.end_time));
                    let best = best_before[prev];
                    best_before.push(if cue.midpoint() > cues[best].midpoint() { i } else { best });
                }
                None => {
                    max_end.push(cue.end_time);
                    best_before.push(0);
                }
            }
        }

        for i in (0..n).rev() {
            let best = match best_after.get(i + 1) {
                Some(&next) if cues[next].midpoint() < cues[i].midpoint() => next,
                _ => i,
            };
            best_after[i] = best;
        }

        Self {
            max_end,
            best_before,
            best_after,
        }
    }

    fn locate(&self, cues: &[Cue], time: f64) -> Option<usize> {
        if cues.is_empty() {
            return None;
        }

        // Все реплики, начавшиеся не позже `time`
        let upper = cues.partition_point(|cue| cue.start_time <= time);

        // Среди начавшихся содержит время та, что ещё не закончилась.
        // Как только максимум концов слева не дотягивает до `time`, искать дальше нечего.
        for i in (0..upper).rev() {
            if self.max_end[i] <= time {
                break;
            }
            if cues[i].end_time > time {
                return Some(i);
            }
        }

        // Ни одна не содержит: слева все середины не больше `time`, справа больше
        let before = upper.checked_sub(1).map(|i| self.best_before[i]);
        let after = (upper < cues.len()).then(|| self.best_after[upper]);

        match (before, after) {
            (Some(b), Some(a)) => {
                let to_before = time - cues[b].midpoint();
                let to_after = cues[a].midpoint() - time;
                Some(if to_after < to_before { a } else { b })
            }
            (Some(b), None) => Some(b),
            (None, after) => after,
        }
    }
}

/// Найти реплику для заданного времени
///
/// Реплики должны быть отсортированы по `start_time`. Сначала бинарным поиском ищется
/// реплика, содержащая время (при перекрытии побеждает начавшаяся позже); если такой
/// нет, берётся реплика с ближайшей серединой интервала (при равенстве побеждает более
/// ранняя). `None` только для пустого списка.
///
/// Строит индекс при каждом вызове; для повторных поисков по одной дорожке
/// используйте [`CueTrack`].
pub fn find_closest_cue(cues: &[Cue], time: f64) -> Option<&Cue> {
    CueIndex::build(cues).locate(cues, time).map(|i| &cues[i])
}
