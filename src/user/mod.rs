mod preferences;

pub use preferences::{
    FilePreferencesStore, InMemoryPreferencesStore, Preferences, PreferencesStore,
    PreferencesUpdate, DEFAULT_TOP_N, DEFAULT_YEAR,
};
