/// Whether subscribers have seen the latest version of the owned state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSyncStatus {
    /// Nothing has been published yet.
    #[default]
    Init,
    /// The state changed since the last publish.
    Dirty,
    /// Subscribers hold the current state.
    Clean,
}
