//! Table rendering for CLI output

use super::colors::table_color_to_colored_str;
use super::{ColorTheme, StatusIcon};
use crate::domain::addon::{AddonStatus, RoleBindingState, WorkloadStatus};
use crate::domain::stack::{DeploymentReport, PropertyValue};
use crate::infrastructure::constants::UNKNOWN_MARKER;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

const MAX_VALUE_WIDTH: usize = 64;

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the execution plan of a previewed stack
    pub fn render_plan(&self, report: &DeploymentReport) -> String {
        if report.results.is_empty() {
            return format!("Stack {} declares no resources", report.stack);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("STEP").set_alignment(CellAlignment::Center),
                Cell::new("LEVEL").set_alignment(CellAlignment::Center),
                Cell::new("TYPE").set_alignment(CellAlignment::Left),
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("DEPENDS ON").set_alignment(CellAlignment::Left),
                Cell::new("INPUTS").set_alignment(CellAlignment::Center),
            ]);

        for result in &report.results {
            let resource = &result.resource;
            let unknown = resource.unknown_properties().len();
            let icon = StatusIcon::get_resolution_icon(unknown);
            let status = if unknown == 0 {
                format!("{} resolved", icon)
            } else {
                format!("{} {} pending", icon, unknown)
            };

            let depends_on = if resource.depends_on.is_empty() {
                "-".to_string()
            } else {
                resource
                    .depends_on
                    .iter()
                    .map(|u| u.name.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            };

            table.add_row(vec![
                Cell::new(result.step).set_alignment(CellAlignment::Center),
                Cell::new(result.level).set_alignment(CellAlignment::Center),
                Cell::new(resource.kind().display_name()),
                Cell::new(&resource.urn.name),
                Cell::new(depends_on),
                Cell::new(status).fg(self.theme.get_value_color(unknown == 0)),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Stack {} {} ─╮\n",
            report.stack,
            format!(
                "[{} resources, engine: {}]",
                report.results.len(),
                report.engine
            )
            .color(table_color_to_colored_str(self.theme.muted))
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Resolved  {} Waiting on a dependency\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::PENDING.yellow()
        ));

        output
    }

    /// Render the inputs and outputs of every resource in a report
    pub fn render_properties(&self, report: &DeploymentReport) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("RESOURCE"),
                Cell::new("PROPERTY"),
                Cell::new("VALUE"),
            ]);

        for result in &report.results {
            let mut first = true;
            for (key, value) in &result.outputs {
                let resource = if first {
                    result.resource.urn.name.clone()
                } else {
                    String::new()
                };
                first = false;

                table.add_row(vec![
                    Cell::new(resource),
                    Cell::new(key),
                    Cell::new(format_value(value)).fg(self.theme.get_value_color(value.is_known())),
                ]);
            }
        }

        table.to_string()
    }

    /// Render the in-cluster state of the add-on
    pub fn render_addon_status(&self, status: &AddonStatus) -> String {
        let (overall, overall_color) = if status.is_ready() {
            (format!("{} Ready", StatusIcon::SUCCESS), Color::Green)
        } else if matches!(status.role_binding, RoleBindingState::Mismatch { .. }) {
            (format!("{} Misconfigured", StatusIcon::ERROR), Color::Red)
        } else {
            (format!("{} Not Ready", StatusIcon::WARNING), Color::Yellow)
        };

        let binding_text = match &status.role_binding {
            RoleBindingState::Matches(arn) => format!("{} (expected)", arn),
            RoleBindingState::Annotated(arn) => arn.clone(),
            RoleBindingState::Mismatch { expected, actual } => {
                format!("{}\n  expected: {}", actual, expected)
            }
            RoleBindingState::Unannotated => "no role annotation".to_string(),
            RoleBindingState::ServiceAccountMissing => "service account not found".to_string(),
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.add_row(vec![
            Cell::new("📊 EBS CSI Driver Status").set_alignment(CellAlignment::Center)
        ]);
        table.add_row(vec![Cell::new(format!(
            "Namespace: {} | Service Account: {}",
            status.namespace, status.service_account
        ))]);
        table.add_row(vec![Cell::new(format!("Status: {}", overall)).fg(overall_color)]);
        table.add_row(vec![Cell::new(format!(
            "{} Role: {}",
            StatusIcon::get_binding_icon(&status.role_binding),
            binding_text
        ))
        .fg(self.theme.get_binding_color(&status.role_binding))]);

        table.add_row(vec![
            self.workload_cell("🔷 Controller", "Deployment", status.controller.as_ref()),
            self.workload_cell("🔶 Node", "DaemonSet", status.node.as_ref()),
        ]);

        table.to_string()
    }

    fn workload_cell(&self, title: &str, kind: &str, workload: Option<&WorkloadStatus>) -> Cell {
        match workload {
            Some(w) => Cell::new(format!(
                "{}\n  {}: {}\n  Ready: {} {}/{} ({})",
                title,
                kind,
                w.name,
                StatusIcon::get_replica_icon(w.ready, w.desired),
                w.ready,
                w.desired,
                StatusIcon::get_status_text(w.ready, w.desired)
            ))
            .fg(self.theme.get_replica_color(w.ready, w.desired)),
            None => Cell::new(format!("{}\n  {} not found", title, kind)).fg(self.theme.error),
        }
    }
}

fn format_value(value: &PropertyValue) -> String {
    let text = match value {
        PropertyValue::Unknown => return UNKNOWN_MARKER.to_string(),
        PropertyValue::Known(serde_json::Value::String(s)) => s.clone(),
        PropertyValue::Known(v) => v.to_string(),
    };

    if text.chars().count() > MAX_VALUE_WIDTH {
        let head: String = text.chars().take(MAX_VALUE_WIDTH - 1).collect();
        format!("{}…", head)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stack::{
        PropertyMap, ResolvedResource, ResourceKind, ResourceResult, Urn,
    };

    fn report() -> DeploymentReport {
        let cluster = Urn::new(ResourceKind::Cluster, "my-cluster");
        let mut outputs = PropertyMap::new();
        outputs.insert(
            "name".to_string(),
            PropertyValue::Known(serde_json::json!("prod-eks")),
        );
        outputs.insert("oidcProviderArn".to_string(), PropertyValue::Unknown);

        DeploymentReport {
            stack: "dev".to_string(),
            engine: "preview".to_string(),
            results: vec![ResourceResult {
                step: 1,
                level: 0,
                resource: ResolvedResource {
                    urn: cluster,
                    depends_on: vec![],
                    properties: PropertyMap::new(),
                },
                outputs,
            }],
        }
    }

    #[test]
    fn test_render_empty_plan() {
        let renderer = TableRenderer::new();
        let empty = DeploymentReport {
            stack: "dev".to_string(),
            engine: "preview".to_string(),
            results: vec![],
        };
        assert!(renderer.render_plan(&empty).contains("declares no resources"));
    }

    #[test]
    fn test_render_plan() {
        let renderer = TableRenderer::new();
        let output = renderer.render_plan(&report());
        assert!(output.contains("my-cluster"));
        assert!(output.contains("EKS Cluster"));
        assert!(output.contains("resolved"));
    }

    #[test]
    fn test_render_properties_marks_unknown() {
        let renderer = TableRenderer::new();
        let output = renderer.render_properties(&report());
        assert!(output.contains("prod-eks"));
        assert!(output.contains("[unknown]"));
    }

    #[test]
    fn test_long_values_are_truncated() {
        let value = PropertyValue::Known(serde_json::json!("x".repeat(200)));
        let text = format_value(&value);
        assert_eq!(text.chars().count(), MAX_VALUE_WIDTH);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn test_render_addon_status() {
        let renderer = TableRenderer::new();
        let status = AddonStatus {
            namespace: "kube-system".to_string(),
            service_account: "ebs-csi-controller-sa".to_string(),
            role_binding: RoleBindingState::Matches("arn:aws:iam::111:role/r".to_string()),
            controller: Some(WorkloadStatus {
                name: "ebs-csi-controller".to_string(),
                desired: 2,
                ready: 2,
            }),
            node: None,
        };
        let output = renderer.render_addon_status(&status);
        assert!(output.contains("Not Ready"));
        assert!(output.contains("ebs-csi-controller"));
        assert!(output.contains("DaemonSet not found"));
    }
}
