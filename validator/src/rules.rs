use cfb::{Block, InstructionKind};

use crate::finding::Severity;

/// Outcome of one rule over a block sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Failed. Holds the indices of the blocks at fault, which is empty
    /// when the problem is something missing from the document.
    Fail(Vec<usize>),
}

impl Verdict {
    fn from_indices(indices: Vec<usize>) -> Self {
        if indices.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail(indices)
        }
    }
}

/// A named structural check over the whole ordered block sequence.
pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub help: &'static str,
    pub check: fn(&[Block]) -> Verdict,
}

/// Every rule, in the order findings are reported.
pub static RULES: &[Rule] = &[
    Rule {
        id: "require-base-kind",
        severity: Severity::Error,
        message: "A FROM instruction is required. Specify a base image.",
        help: "Place FROM at the top of the file to choose the image everything else builds on.",
        check: require_base_kind,
    },
    Rule {
        id: "base-kind-should-be-first",
        severity: Severity::Warning,
        message: "FROM should be the first instruction (only ARG may precede it).",
        help: "ARG is the only instruction allowed before FROM.",
        check: base_kind_should_be_first,
    },
    Rule {
        id: "single-effective-startup-command",
        severity: Severity::Warning,
        message: "There are multiple CMD instructions. Only the last one takes effect.",
        help: "Keep a single CMD instruction.",
        check: single_startup_command,
    },
    Rule {
        id: "single-effective-entrypoint",
        severity: Severity::Warning,
        message: "There are multiple ENTRYPOINT instructions. Only the last one takes effect.",
        help: "Keep a single ENTRYPOINT instruction.",
        check: single_entrypoint,
    },
    Rule {
        id: "workdir-before-copy",
        severity: Severity::Warning,
        message: "COPY/ADD is used before WORKDIR is set.",
        help: "Setting WORKDIR first makes it clear where copied files end up.",
        check: workdir_before_copy,
    },
    Rule {
        id: "valid-expose-port",
        severity: Severity::Error,
        message: "EXPOSE has an invalid port number. Use a value from 1 to 65535.",
        help: "Port numbers must be between 1 and 65535.",
        check: valid_expose_port,
    },
    Rule {
        id: "user-requires-creation",
        severity: Severity::Warning,
        message: "USER is set, but no user creation command (useradd etc.) was found.",
        help: "If the user does not exist in the base image, create it first with RUN useradd.",
        check: user_requires_creation,
    },
    Rule {
        id: "run-command-non-empty",
        severity: Severity::Error,
        message: "A RUN instruction has no command.",
        help: "RUN needs the command to execute.",
        check: run_command_non_empty,
    },
    Rule {
        id: "base-image-non-empty",
        severity: Severity::Error,
        message: "A FROM instruction has no image.",
        help: "FROM needs a base image, for example ubuntu:22.04.",
        check: base_image_non_empty,
    },
    Rule {
        id: "copy-paths-present",
        severity: Severity::Error,
        message: "A COPY/ADD instruction is missing its source or destination.",
        help: "COPY and ADD need both a source and a destination.",
        check: copy_paths_present,
    },
    Rule {
        id: "env-key-value-present",
        severity: Severity::Error,
        message: "An ENV instruction is missing its name or value.",
        help: "ENV needs both a variable name and a value.",
        check: env_key_value_present,
    },
];

pub fn find(id: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.id == id)
}

fn is_copy_like(block: &Block) -> bool {
    block.is(InstructionKind::Copy) || block.is(InstructionKind::Add)
}

/// Indices of the blocks of `kind` that fail `ok`.
fn offending(blocks: &[Block], kind: InstructionKind, ok: impl Fn(&Block) -> bool) -> Verdict {
    Verdict::from_indices(
        blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is(kind) && !ok(*b))
            .map(|(i, _)| i)
            .collect(),
    )
}

/// Every block of `kind` but the last, when there is more than one.
fn shadowed(blocks: &[Block], kind: InstructionKind) -> Verdict {
    let mut indices: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is(kind))
        .map(|(i, _)| i)
        .collect();
    indices.pop();
    Verdict::from_indices(indices)
}

fn require_base_kind(blocks: &[Block]) -> Verdict {
    if blocks.iter().any(|b| b.is(InstructionKind::From)) {
        Verdict::Pass
    } else {
        Verdict::Fail(Vec::new())
    }
}

fn base_kind_should_be_first(blocks: &[Block]) -> Verdict {
    let Some(first) = blocks.first() else {
        return Verdict::Pass;
    };
    match first.kind {
        InstructionKind::From => Verdict::Pass,
        InstructionKind::Arg if require_base_kind(blocks) == Verdict::Pass => Verdict::Pass,
        _ => Verdict::Fail(vec![0]),
    }
}

fn single_startup_command(blocks: &[Block]) -> Verdict {
    shadowed(blocks, InstructionKind::Cmd)
}

fn single_entrypoint(blocks: &[Block]) -> Verdict {
    shadowed(blocks, InstructionKind::Entrypoint)
}

fn workdir_before_copy(blocks: &[Block]) -> Verdict {
    for (index, block) in blocks.iter().enumerate() {
        if block.is(InstructionKind::Workdir) {
            return Verdict::Pass;
        }
        if is_copy_like(block) {
            return Verdict::Fail(vec![index]);
        }
    }
    Verdict::Pass
}

fn valid_expose_port(blocks: &[Block]) -> Verdict {
    offending(blocks, InstructionKind::Expose, |b| {
        let port = b.value("port");
        port.is_empty() || parse_port(port).is_some_and(|n| (1..=65535).contains(&n))
    })
}

/// Leading-integer parse: optional whitespace and sign, then digits.
/// Trailing text is ignored, so `8080/tcp` reads as 8080.
fn parse_port(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    // Saturate on overflow: any such value is out of range anyway.
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

const USER_CREATION: [&str; 3] = ["useradd", "adduser", "groupadd"];

fn user_requires_creation(blocks: &[Block]) -> Verdict {
    let mut user_created = false;
    for (index, block) in blocks.iter().enumerate() {
        if block.is(InstructionKind::Run) {
            let command = block.value("command").to_lowercase();
            if USER_CREATION.iter().any(|c| command.contains(c)) {
                user_created = true;
            }
        }
        if block.is(InstructionKind::User)
            && block.value("username") != "root"
            && !user_created
            && index > 0
        {
            return Verdict::Fail(vec![index]);
        }
    }
    Verdict::Pass
}

fn run_command_non_empty(blocks: &[Block]) -> Verdict {
    offending(blocks, InstructionKind::Run, |b| {
        !b.value("command").trim().is_empty()
    })
}

fn base_image_non_empty(blocks: &[Block]) -> Verdict {
    offending(blocks, InstructionKind::From, |b| {
        !b.value("image").trim().is_empty()
    })
}

fn copy_paths_present(blocks: &[Block]) -> Verdict {
    Verdict::from_indices(
        blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                is_copy_like(b) && !(b.values.is_present("source") && b.values.is_present("dest"))
            })
            .map(|(i, _)| i)
            .collect(),
    )
}

fn env_key_value_present(blocks: &[Block]) -> Verdict {
    offending(blocks, InstructionKind::Env, |b| {
        b.values.is_present("key") && b.values.is_present("value")
    })
}
