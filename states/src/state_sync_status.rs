#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSyncStatus {
    /// Registered, never synced.
    #[default]
    BeforeInit,
    /// Changed since the last sync.
    Dirty,
    Clean,
}
