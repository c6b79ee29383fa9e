//! Panel action visibility, driven only by explicit inputs.

use polars::prelude::DataFrame;

/// Panel kind that offers table export.
pub const C_PANEL_KIND_TABLE: &str = "table";

/// Actions a panel header can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPanelAction {
    /// Download the first frame as XLSX.
    ExportXlsx,
    /// Open the panel menu.
    OpenMenu,
    /// Switch the panel to full-screen view.
    ViewFullScreen,
}

/// Which header actions to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecPanelAffordance {
    pub if_show_export: bool,
    pub if_show_menu: bool,
    pub if_show_full_screen: bool,
}

impl SpecPanelAffordance {
    /// Visible actions in header order.
    pub fn actions(&self) -> Vec<EnumPanelAction> {
        let mut l_actions = Vec::new();
        if self.if_show_menu {
            l_actions.push(EnumPanelAction::OpenMenu);
        }
        if self.if_show_export {
            l_actions.push(EnumPanelAction::ExportXlsx);
        }
        if self.if_show_full_screen {
            l_actions.push(EnumPanelAction::ViewFullScreen);
        }
        l_actions
    }
}

/// Decide header actions for a panel.
///
/// Export needs a table panel whose first frame has at least one field. The
/// menu depends on `if_is_admin` only; the exporter itself never sees it.
pub fn derive_panel_affordance(
    panel_kind: &str,
    frame_first: Option<&DataFrame>,
    if_is_admin: bool,
) -> SpecPanelAffordance {
    let if_has_fields = frame_first.is_some_and(|df| df.width() > 0);
    SpecPanelAffordance {
        if_show_export: panel_kind == C_PANEL_KIND_TABLE && if_has_fields,
        if_show_menu: if_is_admin,
        if_show_full_screen: true,
    }
}
