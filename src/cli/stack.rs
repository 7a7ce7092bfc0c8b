//! Stack commands

use crate::domain::addon::AddonInspector;
use crate::domain::config::{apply_to_stack_conf, parse_dynamic_configs, StackConf};
use crate::domain::identity::{AwsAccount, ClusterIdentity};
use crate::domain::policy::{ebs_csi_driver_policy, PolicyDocument};
use crate::domain::stack::{DesiredStateManifest, OutputFormat, StackDescriptor};
use crate::infrastructure::constants::{
    CONF_FILE_ENV, POLICY_PATH, READY_MAX_WAIT_SECONDS, READY_POLL_INTERVAL_SECONDS,
};
use crate::infrastructure::engine::PreviewEngine;
use clap::{Args, Parser};
use std::time::Duration;

/// Options shared by every command that builds the stack configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct StackArgs {
    /// Path to the stack configuration file (TOML)
    /// If not provided, EBS_CSI_STACK_CONF is used, then built-in defaults
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Stack name, prefixed to the IAM role, policy and attachment names
    #[arg(long, short = 's')]
    pub stack: Option<String>,

    /// Dynamic configuration properties to override any settings (-D key=value)
    ///
    /// Stack: stack.name
    /// Cluster: cluster.name, cluster.create-oidc-provider
    /// Service account: service-account.namespace, service-account.name
    /// Add-on: addon.resource-name, addon.name, addon.version, addon.resolve-conflicts (NONE|OVERWRITE|PRESERVE)
    /// Policy: policy.path, policy.description
    /// Kubernetes: kubernetes.config.file, kubernetes.context
    ///
    /// Example: -Daddon.version=v1.20.0-eksbuild.1 -Dservice-account.namespace=storage
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

impl StackArgs {
    /// Priority: -D properties > command line > config file > defaults
    pub fn load_conf(&self) -> anyhow::Result<StackConf> {
        let mut conf = if let Some(ref config_path) = self.config_file {
            StackConf::from(config_path)?
        } else if let Ok(env_path) = std::env::var(CONF_FILE_ENV) {
            StackConf::from(&env_path)?
        } else {
            eprintln!("ℹ️  No configuration file specified, using default settings");
            StackConf::default()
        };

        if let Some(ref stack) = self.stack {
            conf.stack = stack.clone();
        }

        if !self.properties.is_empty() {
            let dynamic_configs = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_to_stack_conf(&dynamic_configs, &mut conf)?;
        }

        Ok(conf)
    }

    pub fn descriptor(&self) -> anyhow::Result<StackDescriptor> {
        let conf = self.load_conf()?;
        StackDescriptor::new(conf).map_err(|e| anyhow::anyhow!("Invalid stack configuration: {}", e))
    }
}

/// Values a real engine would report, supplied up front for a preview.
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// OIDC provider URL of the cluster (e.g. https://oidc.eks.us-west-2.amazonaws.com/id/EXAMPLE)
    #[arg(long, requires = "oidc_arn")]
    pub oidc_url: Option<String>,

    /// OIDC provider ARN of the cluster
    #[arg(long, requires = "oidc_url")]
    pub oidc_arn: Option<String>,

    /// EKS cluster name as reported by AWS (defaults to the cluster resource name)
    #[arg(long)]
    pub cluster_name: Option<String>,

    /// ARN of an existing driver role, used instead of a derived one
    #[arg(long)]
    pub role_arn: Option<String>,

    /// AWS account id, used to derive IAM ARNs
    #[arg(long)]
    pub account_id: Option<String>,

    /// AWS partition for derived ARNs
    #[arg(long, default_value = "aws")]
    pub partition: String,
}

impl IdentityArgs {
    pub fn cluster_identity(&self, conf: &StackConf) -> Option<ClusterIdentity> {
        match (&self.oidc_url, &self.oidc_arn) {
            (Some(url), Some(arn)) => Some(ClusterIdentity::new(
                self.cluster_name
                    .clone()
                    .unwrap_or_else(|| conf.cluster.name.clone()),
                url.clone(),
                arn.clone(),
            )),
            _ => None,
        }
    }

    pub fn preview_engine(&self, descriptor: &StackDescriptor) -> anyhow::Result<PreviewEngine> {
        let mut engine = PreviewEngine::new();

        if let Some(ref account_id) = self.account_id {
            engine = engine.with_account(AwsAccount::new(self.partition.clone(), account_id.clone()));
        }

        if let Some(identity) = self.cluster_identity(descriptor.conf()) {
            descriptor
                .validator()
                .validate_identity(&identity)
                .map_err(|e| anyhow::anyhow!("Invalid cluster identity: {}", e))?;
            engine = engine.with_cluster_identity(&descriptor.cluster_urn(), &identity);
        } else if let Some(ref name) = self.cluster_name {
            engine = engine.with_output(descriptor.cluster_urn(), "name", name.clone());
        }

        if let Some(ref role_arn) = self.role_arn {
            engine = engine.with_output(descriptor.role_urn(), "arn", role_arn.clone());
        }

        Ok(engine)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Also print every resource's inputs and outputs
    #[arg(long)]
    pub show_properties: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RenderCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub identity: IdentityArgs,

    /// Output format (json, yaml)
    #[arg(long, short = 'f', default_value = "json")]
    pub format: String,

    /// Write the manifest to this file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TrustPolicyCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// OIDC provider URL of the cluster
    #[arg(long)]
    pub oidc_url: String,

    /// OIDC provider ARN of the cluster
    #[arg(long)]
    pub oidc_arn: String,

    /// Print the compact form handed to IAM
    #[arg(long)]
    pub compact: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PermissionPolicyCommand {
    /// Print the compact form handed to IAM
    #[arg(long)]
    pub compact: bool,
}

#[derive(Parser, Debug)]
pub struct StatusCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Kubeconfig file path
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context
    #[arg(long)]
    pub context: Option<String>,

    /// Role ARN the controller service account should carry
    #[arg(long)]
    pub role_arn: Option<String>,

    /// AWS account id, used to derive the expected role ARN
    #[arg(long)]
    pub account_id: Option<String>,

    /// AWS partition for the derived role ARN
    #[arg(long, default_value = "aws")]
    pub partition: String,

    /// Wait until the add-on is ready
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait in seconds
    #[arg(long, default_value_t = READY_MAX_WAIT_SECONDS)]
    pub timeout: u64,
}

fn print_document(document: &PolicyDocument, compact: bool) -> anyhow::Result<()> {
    let text = if compact {
        document.to_json()?
    } else {
        document.to_json_pretty()?
    };
    println!("{}", text);
    Ok(())
}

impl PreviewCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        use crate::cli::display::TableRenderer;

        let descriptor = self.stack.descriptor()?;
        let engine = self.identity.preview_engine(&descriptor)?;

        let (declared, report) = descriptor
            .preview(&engine)
            .await
            .map_err(|e| anyhow::anyhow!("Preview failed: {}", e))?;

        let renderer = TableRenderer::new();
        println!("{}", renderer.render_plan(&report));
        if self.show_properties {
            println!("{}", renderer.render_properties(&report));
        }

        let unresolved = report.unresolved();
        if unresolved.is_empty() {
            println!("✓ All inputs of stack {} are resolved", declared.stack.name());
        } else {
            println!("⏳ {} inputs wait on values the engine will produce:", unresolved.len());
            for item in &unresolved {
                println!("  - {}", item);
            }
            println!("  Hint: pass --oidc-url/--oidc-arn and --account-id to resolve them");
        }

        Ok(())
    }
}

impl RenderCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let format = self
            .format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        let descriptor = self.stack.descriptor()?;
        let engine = self.identity.preview_engine(&descriptor)?;

        let (_, report) = descriptor
            .preview(&engine)
            .await
            .map_err(|e| anyhow::anyhow!("Preview failed: {}", e))?;

        let manifest = DesiredStateManifest::from_report(&report)
            .map_err(|e| anyhow::anyhow!("Cannot render manifest: {}", e))?;
        let text = manifest.render(format)?;

        match self.output {
            Some(ref path) => {
                std::fs::write(path, &text)
                    .map_err(|e| anyhow::anyhow!("Failed to write manifest to {}: {}", path, e))?;
                eprintln!("✓ Manifest for stack {} written to: {}", manifest.stack, path);
            }
            None => println!("{}", text),
        }

        Ok(())
    }
}

impl TrustPolicyCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let descriptor = self.stack.descriptor()?;
        let identity = ClusterIdentity::new(
            descriptor.conf().cluster.name.clone(),
            self.oidc_url.clone(),
            self.oidc_arn.clone(),
        );
        descriptor
            .validator()
            .validate_identity(&identity)
            .map_err(|e| anyhow::anyhow!("Invalid cluster identity: {}", e))?;

        let document = descriptor.trust_policy_builder().build_for(&identity);
        print_document(&document, self.compact)
    }
}

impl PermissionPolicyCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        print_document(&ebs_csi_driver_policy(), self.compact)
    }
}

impl StatusCommand {
    fn expected_role_arn(&self, descriptor: &StackDescriptor) -> Option<String> {
        self.role_arn.clone().or_else(|| {
            self.account_id.as_ref().map(|account_id| {
                AwsAccount::new(self.partition.clone(), account_id.clone()).iam_arn(
                    "role",
                    POLICY_PATH,
                    &descriptor.naming().role_name(),
                )
            })
        })
    }

    pub async fn execute(&self) -> anyhow::Result<()> {
        use crate::cli::display::TableRenderer;

        let descriptor = self.stack.descriptor()?;
        let conf = descriptor.conf();

        // Priority: command line > config file > kubeconfig defaults
        let kubeconfig = self
            .kubeconfig
            .clone()
            .or_else(|| conf.kubernetes.kubeconfig.clone());
        let context = self
            .context
            .clone()
            .or_else(|| conf.kubernetes.context.clone());

        let inspector = AddonInspector::new_with_config(
            conf.service_account.namespace.clone(),
            conf.service_account.name.clone(),
            kubeconfig,
            context,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

        let expected = self.expected_role_arn(&descriptor);

        let status = if self.wait {
            println!(
                "Waiting up to {}s for the EBS CSI driver in {}...",
                self.timeout,
                inspector.namespace()
            );
            inspector
                .wait_until_ready(
                    expected.as_deref(),
                    Duration::from_secs(READY_POLL_INTERVAL_SECONDS),
                    Duration::from_secs(self.timeout),
                )
                .await
                .map_err(|e| anyhow::anyhow!("EBS CSI driver is not ready: {}", e))?
        } else {
            inspector
                .inspect(expected.as_deref())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to get add-on status: {}", e))?
        };

        let renderer = TableRenderer::new();
        println!("{}", renderer.render_addon_status(&status));

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn conf_file(stack: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "stack = \"{}\"", stack).unwrap();
        file
    }

    fn args(file: &NamedTempFile, stack: Option<&str>, properties: &[&str]) -> StackArgs {
        StackArgs {
            config_file: Some(file.path().to_string_lossy().into_owned()),
            stack: stack.map(str::to_string),
            properties: properties.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_dynamic_property_wins_over_flag() {
        let file = conf_file("file");
        let conf = args(&file, Some("cli"), &["stack.name=dyn"]).load_conf().unwrap();
        assert_eq!(conf.stack, "dyn");
    }

    #[test]
    fn test_flag_wins_over_config_file() {
        let file = conf_file("file");
        assert_eq!(args(&file, Some("cli"), &[]).load_conf().unwrap().stack, "cli");
        assert_eq!(args(&file, None, &[]).load_conf().unwrap().stack, "file");
    }

    #[test]
    fn test_env_config_file_is_used_without_flag() {
        let file = conf_file("from-env");
        std::env::set_var(CONF_FILE_ENV, file.path());
        let conf = StackArgs::default().load_conf();
        std::env::remove_var(CONF_FILE_ENV);

        assert_eq!(conf.unwrap().stack, "from-env");
    }

    #[test]
    fn test_bad_dynamic_property_is_an_error() {
        let file = conf_file("file");
        assert!(args(&file, None, &["addon.version"]).load_conf().is_err());
    }
}
