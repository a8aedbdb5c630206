use std::fmt;

use crate::block::FieldValues;
use crate::document::Document;
use crate::instruction::InstructionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn stars(self) -> &'static str {
        match self {
            Level::Beginner => "*",
            Level::Intermediate => "**",
            Level::Advanced => "***",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        })
    }
}

type SampleBlock = (InstructionKind, &'static [(&'static str, &'static str)]);

/// A canned document that can replace the canvas in one step.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level: Level,
    blocks: &'static [SampleBlock],
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        key: "webserver",
        name: "Static Web Server",
        description: "Basic web server using Apache (httpd) to serve HTML files.",
        level: Level::Beginner,
        blocks: &[
            (InstructionKind::From, &[("image", "fedora:39")]),
            (
                InstructionKind::Run,
                &[("command", "dnf install -y httpd && dnf clean all")],
            ),
            (
                InstructionKind::Copy,
                &[("source", "index.html"), ("dest", "/var/www/html/")],
            ),
            (InstructionKind::Expose, &[("port", "80")]),
            (
                InstructionKind::Cmd,
                &[("command", "/usr/sbin/httpd -D FOREGROUND")],
            ),
        ],
    },
    Sample {
        key: "breakout",
        name: "Breakout Game",
        description: "Breakout game built with HTML5 Canvas, served by nginx.",
        level: Level::Intermediate,
        blocks: &[
            (InstructionKind::From, &[("image", "fedora:39")]),
            (
                InstructionKind::Run,
                &[("command", "dnf install -y nginx && dnf clean all")],
            ),
            (InstructionKind::Workdir, &[("path", "/usr/share/nginx/html")]),
            (
                InstructionKind::Copy,
                &[("source", "game.html"), ("dest", "index.html")],
            ),
            (InstructionKind::Expose, &[("port", "80")]),
            (
                InstructionKind::Cmd,
                &[("command", "nginx -g \"daemon off;\"")],
            ),
        ],
    },
    Sample {
        key: "multistage",
        name: "Multi-stage Build",
        description: "Builds a Go application in one stage and runs it from a slim second stage.",
        level: Level::Advanced,
        blocks: &[
            (
                InstructionKind::From,
                &[("image", "fedora:39"), ("asName", "builder")],
            ),
            (
                InstructionKind::Run,
                &[("command", "dnf install -y golang git && dnf clean all")],
            ),
            (InstructionKind::Workdir, &[("path", "/app")]),
            (
                InstructionKind::Copy,
                &[("source", "main.go"), ("dest", ".")],
            ),
            (
                InstructionKind::Run,
                &[("command", "go build -o myapp main.go")],
            ),
            (InstructionKind::From, &[("image", "fedora:39")]),
            (InstructionKind::Workdir, &[("path", "/app")]),
            (
                InstructionKind::Copy,
                &[("source", "--from=builder /app/myapp"), ("dest", ".")],
            ),
            (InstructionKind::Expose, &[("port", "8080")]),
            (InstructionKind::Cmd, &[("command", "./myapp")]),
        ],
    },
];

impl Sample {
    pub fn find(key: &str) -> Option<&'static Sample> {
        SAMPLES.iter().find(|s| s.key == key)
    }

    /// A fresh document holding this sample's blocks.
    pub fn load(&self) -> Document {
        let mut document = Document::new();
        for (kind, values) in self.blocks {
            let values: FieldValues = values.iter().copied().collect();
            document.add_with_values(*kind, values);
        }
        tracing::debug!(sample = self.key, blocks = document.len(), "sample loaded");
        document
    }
}
