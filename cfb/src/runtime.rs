use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::instruction::InstructionKind;

/// The container engine the user builds with. Only affects advice text
/// and the suggested commands, never the generated build file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRuntime {
    #[default]
    Podman,
    Docker,
}

impl ContainerRuntime {
    pub fn name(self) -> &'static str {
        match self {
            ContainerRuntime::Podman => "podman",
            ContainerRuntime::Docker => "docker",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ContainerRuntime::Podman => "Podman",
            ContainerRuntime::Docker => "Docker",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ContainerRuntime::Podman => ContainerRuntime::Docker,
            ContainerRuntime::Docker => ContainerRuntime::Podman,
        }
    }

    /// Engine-specific tip for a kind, where one exists.
    pub fn advice(self, kind: InstructionKind) -> Option<&'static str> {
        let tip = match (self, kind) {
            (ContainerRuntime::Podman, InstructionKind::From) => {
                "UBI (ubi9/ubi) or Fedora images integrate best with the Red Hat ecosystem."
            }
            (ContainerRuntime::Podman, InstructionKind::User) => {
                "Specify a non-root user (e.g. USER 1000); rootless execution depends on it."
            }
            (ContainerRuntime::Podman, InstructionKind::Expose) => {
                "Ports below 1024 are not available in rootless mode. Use 8080, 3000 or similar."
            }
            (ContainerRuntime::Podman, InstructionKind::Volume) => {
                "Mind file permissions in rootless mode; set UID/GID ownership explicitly."
            }
            (ContainerRuntime::Docker, InstructionKind::From) => {
                "Official Docker Hub images (node, python, nginx, ...) are plentiful and maintained."
            }
            (ContainerRuntime::Docker, InstructionKind::User) => {
                "Avoid running as root for better security."
            }
            (ContainerRuntime::Docker, InstructionKind::Expose) => {
                "EXPOSE is documentation only; publish ports with docker run -p."
            }
            (ContainerRuntime::Docker, InstructionKind::Volume) => {
                "Named volumes make data easier to manage."
            }
            _ => return None,
        };
        Some(tip)
    }

    /// Cheat sheet for building and running the generated file.
    pub fn build_run_commands(self) -> String {
        let bin = self.name();
        let rootless = match self {
            ContainerRuntime::Podman => " (rootless)",
            ContainerRuntime::Docker => "",
        };
        format!(
            "# Build with {name}\n\
             {bin} build -t my-container -f Containerfile .\n\
             \n\
             # Run with {name}{rootless}\n\
             {bin} run -d -p 8080:8080 my-container\n\
             \n\
             # List containers\n\
             {bin} ps\n\
             \n\
             # Check logs\n\
             {bin} logs <container-id>",
            name = self.display_name(),
        )
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown container runtime `{0}` (expected podman or docker)")]
pub struct ParseRuntimeError(pub String);

impl FromStr for ContainerRuntime {
    type Err = ParseRuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "podman" => Ok(ContainerRuntime::Podman),
            "docker" => Ok(ContainerRuntime::Docker),
            _ => Err(ParseRuntimeError(s.to_string())),
        }
    }
}
