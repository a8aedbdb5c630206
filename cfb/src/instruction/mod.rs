pub mod field;
mod generate;

use std::fmt;
use std::str::FromStr;

use crate::block::FieldValues;

pub use field::{FieldSpec, InputShape};

/// Palette group an instruction kind is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Basic,
    File,
    Exec,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Basic,
        Category::File,
        Category::Exec,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::File => "file",
            Category::Exec => "exec",
            Category::Other => "other",
        }
    }

    /// Kinds in this category, in palette order.
    pub fn kinds(self) -> &'static [InstructionKind] {
        match self {
            Category::Basic => &[InstructionKind::From],
            Category::File => &[
                InstructionKind::Workdir,
                InstructionKind::Copy,
                InstructionKind::Add,
            ],
            Category::Exec => &[
                InstructionKind::Run,
                InstructionKind::Cmd,
                InstructionKind::Entrypoint,
            ],
            Category::Other => &[
                InstructionKind::Env,
                InstructionKind::Expose,
                InstructionKind::User,
                InstructionKind::Volume,
                InstructionKind::Label,
                InstructionKind::Arg,
                InstructionKind::Shell,
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category `{0}` (expected one of: basic, file, exec, other)")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Every build-file directive the editor can place on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstructionKind {
    From,
    Run,
    Cmd,
    Copy,
    Add,
    Workdir,
    Env,
    Expose,
    User,
    Volume,
    Entrypoint,
    Label,
    Arg,
    Shell,
}

const FROM_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("image", "Image")
        .placeholder("fedora:39")
        .required()
        .help("Base image reference, e.g. fedora:39, ubi9/ubi:latest or quay.io/centos/centos:stream9. Docker Hub is used when no registry is given."),
    FieldSpec::text("asName", "Stage name (optional)")
        .placeholder("builder")
        .help("Names this stage so later stages can copy from it with --from=<name>."),
];

const RUN_FIELDS: &[FieldSpec] = &[FieldSpec::multi_line("command", "Command")
    .placeholder("dnf install -y curl git")
    .required()
    .help("Shell command executed once at build time. Chain steps with && to keep layers small.")];

const CMD_FIELDS: &[FieldSpec] = &[FieldSpec::text("command", "Command")
    .placeholder("npm start")
    .required()
    .help("Command run every time the container starts. Quoted arguments are kept together.")];

const COPY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("source", "Source")
        .placeholder("./app")
        .required()
        .help("Path in the build context. Prefix with --from=<stage> to copy from an earlier stage."),
    FieldSpec::text("dest", "Destination")
        .placeholder("/app")
        .required()
        .help("Path inside the image. Relative paths resolve against WORKDIR."),
];

const ADD_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("source", "Source")
        .placeholder("https://example.com/file.tar.gz")
        .required()
        .help("Local path, URL or tar archive. Prefer COPY unless you need download or extraction."),
    FieldSpec::text("dest", "Destination")
        .placeholder("/app")
        .required()
        .help("Path inside the image."),
];

const WORKDIR_FIELDS: &[FieldSpec] = &[FieldSpec::text("path", "Directory")
    .placeholder("/app")
    .required()
    .help("Working directory for the following instructions. Created if missing.")];

const ENV_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("key", "Variable name")
        .placeholder("NODE_ENV")
        .required(),
    FieldSpec::text("value", "Value")
        .placeholder("production")
        .required()
        .help("Available at build time and in the running container."),
];

const EXPOSE_FIELDS: &[FieldSpec] = &[FieldSpec::text("port", "Port")
    .placeholder("8080")
    .required()
    .help("Port the application listens on, between 1 and 65535.")];

const USER_FIELDS: &[FieldSpec] = &[FieldSpec::text("username", "User")
    .placeholder("node")
    .required()
    .help("User (or UID) for the following instructions and the running container. Create it with useradd first.")];

const VOLUME_FIELDS: &[FieldSpec] = &[FieldSpec::text("path", "Mount point")
    .placeholder("/data")
    .required()
    .help("Directory whose data outlives the container.")];

const ENTRYPOINT_FIELDS: &[FieldSpec] = &[FieldSpec::text("command", "Command")
    .placeholder("docker-entrypoint.sh")
    .required()
    .help("Executable always run on start. CMD values become its arguments.")];

const LABEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("key", "Label")
        .placeholder("version")
        .required(),
    FieldSpec::text("value", "Value")
        .placeholder("1.0.0")
        .required(),
];

const ARG_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name", "Argument name")
        .placeholder("NODE_VERSION")
        .required()
        .help("Build-time variable, override with --build-arg NAME=value."),
    FieldSpec::text("default", "Default value")
        .placeholder("18")
        .help("Used when no --build-arg is given."),
];

const SHELL_FIELDS: &[FieldSpec] = &[FieldSpec::text("shell", "Shell")
    .placeholder("/bin/bash")
    .required()
    .help("Shell used by the following RUN instructions. -c is appended automatically.")];

impl InstructionKind {
    pub const ALL: [InstructionKind; 14] = [
        InstructionKind::From,
        InstructionKind::Run,
        InstructionKind::Cmd,
        InstructionKind::Copy,
        InstructionKind::Add,
        InstructionKind::Workdir,
        InstructionKind::Env,
        InstructionKind::Expose,
        InstructionKind::User,
        InstructionKind::Volume,
        InstructionKind::Entrypoint,
        InstructionKind::Label,
        InstructionKind::Arg,
        InstructionKind::Shell,
    ];

    /// The directive keyword as written in the build file.
    pub fn keyword(self) -> &'static str {
        match self {
            InstructionKind::From => "FROM",
            InstructionKind::Run => "RUN",
            InstructionKind::Cmd => "CMD",
            InstructionKind::Copy => "COPY",
            InstructionKind::Add => "ADD",
            InstructionKind::Workdir => "WORKDIR",
            InstructionKind::Env => "ENV",
            InstructionKind::Expose => "EXPOSE",
            InstructionKind::User => "USER",
            InstructionKind::Volume => "VOLUME",
            InstructionKind::Entrypoint => "ENTRYPOINT",
            InstructionKind::Label => "LABEL",
            InstructionKind::Arg => "ARG",
            InstructionKind::Shell => "SHELL",
        }
    }

    pub fn category(self) -> Category {
        match self {
            InstructionKind::From => Category::Basic,
            InstructionKind::Copy | InstructionKind::Add | InstructionKind::Workdir => {
                Category::File
            }
            InstructionKind::Run | InstructionKind::Cmd | InstructionKind::Entrypoint => {
                Category::Exec
            }
            InstructionKind::Env
            | InstructionKind::Expose
            | InstructionKind::User
            | InstructionKind::Volume
            | InstructionKind::Label
            | InstructionKind::Arg
            | InstructionKind::Shell => Category::Other,
        }
    }

    /// One-line summary shown in the palette.
    pub fn description(self) -> &'static str {
        match self {
            InstructionKind::From => "Must come first. Selects the base OS or environment",
            InstructionKind::Run => "Runs once at build time, e.g. to install packages",
            InstructionKind::Cmd => "Runs every time the container starts",
            InstructionKind::Copy => "Copies local files into the image. Use this by default",
            InstructionKind::Add => "Only for URL downloads or automatic tar extraction",
            InstructionKind::Workdir => "Sets the working directory, like a persistent cd",
            InstructionKind::Env => "Sets environment variables",
            InstructionKind::Expose => "Declares the application port (documentation only)",
            InstructionKind::User => "Switches the user. Run as non-root for security",
            InstructionKind::Volume => "Declares persistent data storage",
            InstructionKind::Entrypoint => "Command that always runs and cannot be overridden",
            InstructionKind::Label => "Adds metadata such as version or author",
            InstructionKind::Arg => "Build-time variable, changeable per build",
            InstructionKind::Shell => "Changes the shell used by RUN",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            InstructionKind::From => FROM_FIELDS,
            InstructionKind::Run => RUN_FIELDS,
            InstructionKind::Cmd => CMD_FIELDS,
            InstructionKind::Copy => COPY_FIELDS,
            InstructionKind::Add => ADD_FIELDS,
            InstructionKind::Workdir => WORKDIR_FIELDS,
            InstructionKind::Env => ENV_FIELDS,
            InstructionKind::Expose => EXPOSE_FIELDS,
            InstructionKind::User => USER_FIELDS,
            InstructionKind::Volume => VOLUME_FIELDS,
            InstructionKind::Entrypoint => ENTRYPOINT_FIELDS,
            InstructionKind::Label => LABEL_FIELDS,
            InstructionKind::Arg => ARG_FIELDS,
            InstructionKind::Shell => SHELL_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// The field a fenced code block in a canvas file is assigned to.
    pub fn multi_line_field(self) -> Option<&'static FieldSpec> {
        self.fields()
            .iter()
            .find(|f| f.shape == InputShape::MultiLine)
    }

    /// Produce the single build-file line for this kind.
    ///
    /// Total over all inputs: absent or empty values fall back to the
    /// kind's built-in default.
    pub fn generate(self, values: &FieldValues) -> String {
        generate::generate(self, values)
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown instruction `{0}`")]
pub struct ParseKindError(pub String);

impl FromStr for InstructionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstructionKind::ALL
            .into_iter()
            .find(|k| k.keyword().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}
