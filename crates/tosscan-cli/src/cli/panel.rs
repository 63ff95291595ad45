//! Side panel host for the stand-alone binary.

use tosscan_core::command::PanelHost;

/// No browser UI is attached to a native-messaging host process, so panel
/// requests are always refused; the extension opens the panel itself.
pub struct DetachedPanel;

impl PanelHost for DetachedPanel {
    fn open_side_panel(&self, tab_id: i64, window_id: Option<i64>) -> bool {
        tracing::debug!(tab_id, ?window_id, "side panel request refused");
        false
    }
}
