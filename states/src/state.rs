use std::fmt::Debug;

/// A value owned by a [`crate::StateCtx`].
///
/// States are cloned when published to subscribers, so keep them cheap enough to clone
/// once per sync.
pub trait State: Clone + Debug + Send + 'static {
    /// Name used in log lines.
    const NAME: &'static str = "state";
}
