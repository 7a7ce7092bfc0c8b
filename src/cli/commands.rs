// CLI command definitions

use super::stack::{
    PermissionPolicyCommand, PreviewCommand, RenderCommand, StatusCommand, TrustPolicyCommand,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ebs-csi-stack",
    version,
    about = "Declares the Amazon EBS CSI driver add-on stack on EKS",
    long_about = "A standalone CLI tool that declares the EKS cluster, IAM role, policy and add-on needed by the Amazon EBS CSI driver, previews their dependency order and verifies the installed add-on"
)]
pub struct CliArgs {
    /// Enable debug logging (written to stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Resolve the stack against known values and show the execution plan
    Preview(PreviewCommand),

    /// Write the desired-state manifest for a provisioning engine (JSON or YAML)
    Render(RenderCommand),

    /// Print the IAM trust policy for a cluster's OIDC provider
    TrustPolicy(TrustPolicyCommand),

    /// Print the IAM permission policy of the EBS CSI driver
    PermissionPolicy(PermissionPolicyCommand),

    /// Show the installed add-on's status in the cluster
    Status(StatusCommand),
}
