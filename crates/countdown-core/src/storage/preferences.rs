//! User preferences read from and written to a [`SettingsStore`].
//!
//! Each preference group lives under its own key. A missing or malformed
//! blob never fails a load: the group silently falls back to its default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::settings::SettingsStore;
use crate::alarm::AlarmMode;
use crate::duration::DurationInput;
use crate::error::SettingsError;
use crate::progress::IndicatorShape;

pub const INDICATOR_KEY: &str = "indicator";
pub const ALARM_KEY: &str = "alarm";
pub const DURATION_KEY: &str = "duration";

/// Progress indicator appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPrefs {
    #[serde(default)]
    pub shape: IndicatorShape,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct AlarmPrefs {
    #[serde(default)]
    mode: AlarmMode,
}

fn default_color() -> String {
    "#3b82f6".into()
}

fn default_duration() -> DurationInput {
    DurationInput::new(0, 5, 0)
}

impl Default for IndicatorPrefs {
    fn default() -> Self {
        Self {
            shape: IndicatorShape::default(),
            color: default_color(),
        }
    }
}

/// Everything the user can persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub indicator: IndicatorPrefs,
    pub alarm_mode: AlarmMode,
    /// Last duration the user started a timer with.
    pub duration: DurationInput,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            indicator: IndicatorPrefs::default(),
            alarm_mode: AlarmMode::default(),
            duration: default_duration(),
        }
    }
}

impl Preferences {
    /// Read every group from `store`, substituting defaults for anything
    /// absent or malformed.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let indicator = read_or_default(store, INDICATOR_KEY, IndicatorPrefs::default);
        let alarm = read_or_default(store, ALARM_KEY, AlarmPrefs::default);
        let duration = read_or_default(store, DURATION_KEY, default_duration);
        Self {
            indicator,
            alarm_mode: alarm.mode,
            duration,
        }
    }

    pub fn save_indicator(&self, store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
        store.set(INDICATOR_KEY, serde_json::to_value(&self.indicator)?)
    }

    pub fn save_alarm_mode(&self, store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
        let prefs = AlarmPrefs {
            mode: self.alarm_mode,
        };
        store.set(ALARM_KEY, serde_json::to_value(prefs)?)
    }

    pub fn save_duration(&self, store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
        store.set(DURATION_KEY, serde_json::to_value(self.duration)?)
    }
}

fn read_or_default<T, F>(store: &dyn SettingsStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let Some(blob) = store.get(key) else {
        return default();
    };
    serde_json::from_value(blob).unwrap_or_else(|err| {
        warn!(key, error = %err, "ignoring malformed setting");
        default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn empty_store_yields_defaults() {
        let prefs = Preferences::load(&MemoryStore::new());
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.alarm_mode, AlarmMode::Fast);
        assert_eq!(prefs.indicator.shape, IndicatorShape::Ring);
        assert_eq!(prefs.duration.total_secs(), 300);
    }

    #[test]
    fn malformed_groups_fall_back_individually() {
        let mut store = MemoryStore::new();
        store.set(INDICATOR_KEY, json!("square")).unwrap();
        store.set(ALARM_KEY, json!({"mode": "slow"})).unwrap();
        store.set(DURATION_KEY, json!({"hours": "two"})).unwrap();

        let prefs = Preferences::load(&store);
        assert_eq!(prefs.indicator, IndicatorPrefs::default());
        assert_eq!(prefs.alarm_mode, AlarmMode::Slow);
        assert_eq!(prefs.duration, default_duration());
    }

    #[test]
    fn partial_blobs_keep_known_fields() {
        let mut store = MemoryStore::new();
        store.set(INDICATOR_KEY, json!({"shape": "square"})).unwrap();
        store.set(DURATION_KEY, json!({"hours": 150, "minutes": 1})).unwrap();

        let prefs = Preferences::load(&store);
        assert_eq!(prefs.indicator.shape, IndicatorShape::Square);
        assert_eq!(prefs.indicator.color, "#3b82f6");
        assert_eq!(prefs.duration, DurationInput::new(99, 1, 0));
    }

    #[test]
    fn saved_groups_load_back() {
        let mut store = MemoryStore::new();
        let prefs = Preferences {
            indicator: IndicatorPrefs {
                shape: IndicatorShape::Square,
                color: "#ff5733".into(),
            },
            alarm_mode: AlarmMode::None,
            duration: DurationInput::new(0, 1, 30),
        };
        prefs.save_indicator(&mut store).unwrap();
        prefs.save_alarm_mode(&mut store).unwrap();
        prefs.save_duration(&mut store).unwrap();

        assert_eq!(store.get(ALARM_KEY), Some(json!({"mode": "none"})));
        assert_eq!(Preferences::load(&store), prefs);
    }
}
