use serde::{Deserialize, Serialize};
use std::fmt;

/// Target operating system of a test, derived from the raw corpus tag.
///
/// Unrecognized tags map to `Unknown` so that a single odd record never
/// aborts a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Darwin,
    Linux,
    Unknown,
}

impl Platform {
    /// Map a raw `supported_platforms` tag (`windows`, `macos`, `linux`).
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "windows" => Platform::Windows,
            "macos" => Platform::Darwin,
            "linux" => Platform::Linux,
            _ => Platform::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shell family a command string targets, derived from the raw executor tag.
///
/// `Manual` marks tests meant for a human operator; they are never
/// automated. `Unknown` flows through normalization as a pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Cmd,
    Sh,
    Psh,
    Manual,
    Unknown,
}

impl Dialect {
    /// Map a raw executor name (`command_prompt`, `sh`, `bash`, `powershell`).
    pub fn from_executor(name: &str) -> Self {
        match name {
            "command_prompt" => Dialect::Cmd,
            "sh" | "bash" => Dialect::Sh,
            "powershell" => Dialect::Psh,
            "manual" => Dialect::Manual,
            _ => Dialect::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Cmd => "cmd",
            Dialect::Sh => "sh",
            Dialect::Psh => "psh",
            Dialect::Manual => "manual",
            Dialect::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
