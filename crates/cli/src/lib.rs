//! `gatekeeper` command line: argument model and command execution.
//!
//! Commands return their output instead of printing it; `main` does the IO.

use anyhow::Context;
use clap::{Parser, Subcommand};
use gatekeeper_auth::{
    AuthConfig, CredentialAuthority, Permission, PermissionMatcher, Role, RoleCapabilitySet,
};

#[derive(Debug, Parser)]
#[command(
    name = "gatekeeper",
    about = "Issue and verify credentials, and check role permissions"
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Issue a credential for a subject (needs GATEKEEPER_SECRET).
    Issue { subject: String },

    /// Verify a credential and print its subject (needs GATEKEEPER_SECRET).
    Verify { token: String },

    /// Print "allow" or "deny" for a role and a `resource:action` permission;
    /// exits non-zero on deny.
    Check { role: Role, permission: Permission },

    /// Print the JSON explanation of an access decision.
    Explain { role: Role, permission: Permission },

    /// Print the role → permission table as JSON.
    Roles,
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub stdout: String,
    pub stderr: Option<String>,
    pub success: bool,
}

impl Outcome {
    fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: None,
            success: true,
        }
    }
}

/// Run `command`, reading configuration through `lookup` (environment
/// variable name → value).
pub fn run<F>(command: Command, lookup: F) -> anyhow::Result<Outcome>
where
    F: Fn(&str) -> Option<String>,
{
    let matcher = PermissionMatcher::new(RoleCapabilitySet::default());

    match command {
        Command::Issue { subject } => {
            let credential = authority(lookup)?
                .issue(subject)
                .context("failed to issue credential")?;
            Ok(Outcome {
                stdout: credential.token().to_string(),
                stderr: Some(format!("expires at {}", credential.expires_at().to_rfc3339())),
                success: true,
            })
        }
        Command::Verify { token } => match authority(lookup)?.verify(token.trim()) {
            Ok(subject) => Ok(Outcome::ok(subject.into_inner())),
            Err(e) => Ok(Outcome {
                stdout: String::new(),
                stderr: Some(format!("rejected: {e}")),
                success: false,
            }),
        },
        Command::Check { role, permission } => {
            let allowed = matcher.has_permission(Some(role), &permission);
            tracing::info!(%role, %permission, allowed, "access checked");
            Ok(Outcome {
                stdout: if allowed { "allow" } else { "deny" }.to_string(),
                stderr: None,
                success: allowed,
            })
        }
        Command::Explain { role, permission } => {
            let explanation = matcher.explain(Some(role), &permission);
            Ok(Outcome::ok(serde_json::to_string_pretty(&explanation)?))
        }
        Command::Roles => {
            let definitions = matcher.capabilities().definitions();
            Ok(Outcome::ok(serde_json::to_string_pretty(&definitions)?))
        }
    }
}

fn authority<F>(lookup: F) -> anyhow::Result<CredentialAuthority>
where
    F: Fn(&str) -> Option<String>,
{
    let config = AuthConfig::from_lookup(lookup).context("credential configuration")?;
    Ok(CredentialAuthority::new(&config))
}
