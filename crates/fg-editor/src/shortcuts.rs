//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `EditAction`s. Hosts forward raw
//! `KeyboardEvent.key` values and modifier flags; the editor decides.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Delete the selected nodes, or else the selected edge.
    DeleteSelection,
    Deselect,
    GroupSelection,
    UngroupSelection,
    /// Flip between single and multi select.
    ToggleMultiSelect,
}

/// Resolves key events into edit actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<EditAction> {
        let cmd = ctrl || meta;
        if alt {
            return None;
        }

        if cmd && shift {
            return match key {
                "g" | "G" => Some(EditAction::UngroupSelection),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "g" | "G" => Some(EditAction::GroupSelection),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(EditAction::DeleteSelection),
            "Escape" => Some(EditAction::Deselect),
            "m" | "M" => Some(EditAction::ToggleMultiSelect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(EditAction::DeleteSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(EditAction::DeleteSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(EditAction::Deselect)
        );
        assert_eq!(
            ShortcutMap::resolve("m", false, false, false, false),
            Some(EditAction::ToggleMultiSelect)
        );
    }

    #[test]
    fn group_with_either_modifier() {
        assert_eq!(
            ShortcutMap::resolve("g", true, false, false, false),
            Some(EditAction::GroupSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("g", false, false, false, true),
            Some(EditAction::GroupSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("G", false, true, false, true),
            Some(EditAction::UngroupSelection)
        );
    }

    #[test]
    fn unbound_combos() {
        assert_eq!(ShortcutMap::resolve("g", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("m", true, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("Delete", false, false, true, false), None);
        assert_eq!(ShortcutMap::resolve("M", false, true, false, false), None);
    }
}
