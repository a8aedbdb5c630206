use serde_json::Value;

use crate::block::FieldValues;
use crate::instruction::InstructionKind;
use crate::tokenize::tokenize;

pub(super) fn generate(kind: InstructionKind, values: &FieldValues) -> String {
    let keyword = kind.keyword();
    match kind {
        InstructionKind::From => {
            let image = or_default(values.get("image"), "fedora:39");
            match values.get("asName") {
                "" => format!("{keyword} {image}"),
                stage => format!("{keyword} {image} AS {stage}"),
            }
        }
        InstructionKind::Run => {
            format!("{keyword} {}", or_default(values.get("command"), "echo \"Hello\""))
        }
        InstructionKind::Cmd => {
            let parts = tokenize(or_default(values.get("command"), "bash"));
            format!("{keyword} {}", array_literal(parts))
        }
        InstructionKind::Entrypoint => {
            let parts = tokenize(or_default(values.get("command"), "sh"));
            format!("{keyword} {}", array_literal(parts))
        }
        InstructionKind::Copy | InstructionKind::Add => format!(
            "{keyword} {} {}",
            or_default(values.get("source"), "."),
            or_default(values.get("dest"), "/app"),
        ),
        InstructionKind::Workdir => {
            format!("{keyword} {}", or_default(values.get("path"), "/app"))
        }
        InstructionKind::Env => format!(
            "{keyword} {}={}",
            or_default(values.get("key"), "KEY"),
            or_default(values.get("value"), "value"),
        ),
        InstructionKind::Label => format!(
            "{keyword} {}=\"{}\"",
            or_default(values.get("key"), "key"),
            or_default(values.get("value"), "value"),
        ),
        InstructionKind::Expose => {
            format!("{keyword} {}", or_default(values.get("port"), "8080"))
        }
        InstructionKind::User => {
            format!("{keyword} {}", or_default(values.get("username"), "root"))
        }
        InstructionKind::Volume => {
            let path = or_default(values.get("path"), "/data");
            format!("{keyword} {}", array_literal(vec![path.to_string()]))
        }
        InstructionKind::Arg => {
            let name = or_default(values.get("name"), "ARG");
            match values.get("default") {
                "" => format!("{keyword} {name}"),
                default => format!("{keyword} {name}={default}"),
            }
        }
        InstructionKind::Shell => {
            let mut parts = tokenize(or_default(values.get("shell"), "/bin/sh"));
            if !parts.iter().any(|p| p == "-c") {
                parts.push("-c".to_string());
            }
            format!("{keyword} {}", array_literal(parts))
        }
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

/// Compact JSON array of strings, e.g. `["nginx","-g","daemon off;"]`.
fn array_literal(parts: Vec<String>) -> String {
    Value::from(parts).to_string()
}
