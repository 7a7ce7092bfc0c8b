//! Color theme for CLI output

use crate::domain::addon::RoleBindingState;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color based on replica status
    pub fn get_replica_color(&self, ready: u32, total: u32) -> TableColor {
        if total == 0 {
            self.muted
        } else if ready == total {
            self.success
        } else if ready > 0 {
            self.warning
        } else {
            self.error
        }
    }

    /// Known values in the default color, deferred ones muted
    pub fn get_value_color(&self, known: bool) -> TableColor {
        if known {
            self.info
        } else {
            self.muted
        }
    }

    pub fn get_binding_color(&self, binding: &RoleBindingState) -> TableColor {
        match binding {
            RoleBindingState::Matches(_) => self.success,
            RoleBindingState::Annotated(_) => self.info,
            RoleBindingState::Unannotated | RoleBindingState::ServiceAccountMissing => {
                self.warning
            }
            RoleBindingState::Mismatch { .. } => self.error,
        }
    }
}

/// Convert comfy_table::Color to colored::Color string representation
pub fn table_color_to_colored_str(color: TableColor) -> &'static str {
    match color {
        TableColor::Green => "green",
        TableColor::Yellow => "yellow",
        TableColor::Red => "red",
        TableColor::Cyan => "cyan",
        TableColor::DarkGrey => "bright black",
        _ => "white",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_get_replica_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_replica_color(2, 2), TableColor::Green);
        assert_eq!(theme.get_replica_color(1, 2), TableColor::Yellow);
        assert_eq!(theme.get_replica_color(0, 2), TableColor::Red);
        assert_eq!(theme.get_replica_color(0, 0), TableColor::DarkGrey);
    }

    #[test]
    fn test_get_binding_color() {
        let theme = ColorTheme::default();
        assert_eq!(
            theme.get_binding_color(&RoleBindingState::Matches("arn".to_string())),
            TableColor::Green
        );
        assert_eq!(
            theme.get_binding_color(&RoleBindingState::Mismatch {
                expected: "a".to_string(),
                actual: "b".to_string()
            }),
            TableColor::Red
        );
        assert_eq!(
            theme.get_binding_color(&RoleBindingState::Unannotated),
            TableColor::Yellow
        );
    }

    #[test]
    fn test_colored_str() {
        assert_eq!(table_color_to_colored_str(TableColor::DarkGrey), "bright black");
        assert_eq!(table_color_to_colored_str(TableColor::Blue), "white");
    }
}
