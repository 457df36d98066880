// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command documents: which interpreter runs a dispatched command.

use crate::instance::Platform;
use serde::{Deserialize, Serialize};

const SHELL_SCRIPT: &str = "AWS-RunShellScript";
const POWERSHELL_SCRIPT: &str = "AWS-RunPowerShellScript";

/// The service-side document a command runs under.
///
/// Serializes to/from the service's document name. Names the service may
/// report that we don't know about are kept verbatim in `Other` and match
/// neither Linux nor Windows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    ShellScript,
    PowerShellScript,
    Other(String),
}

impl DocumentType {
    /// Every document whose output streams the log store may hold.
    pub const SUPPORTED: [DocumentType; 2] =
        [DocumentType::ShellScript, DocumentType::PowerShellScript];

    /// Pick the document for a shell name as given on the command line.
    ///
    /// `powershell` selects the PowerShell document; anything else runs
    /// under the POSIX shell document.
    pub fn for_shell(shell: &str) -> Self {
        if shell.eq_ignore_ascii_case("powershell") {
            DocumentType::PowerShellScript
        } else {
            DocumentType::ShellScript
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            SHELL_SCRIPT => DocumentType::ShellScript,
            POWERSHELL_SCRIPT => DocumentType::PowerShellScript,
            other => DocumentType::Other(other.to_string()),
        }
    }

    /// The service's name for this document.
    pub fn name(&self) -> &str {
        match self {
            DocumentType::ShellScript => SHELL_SCRIPT,
            DocumentType::PowerShellScript => POWERSHELL_SCRIPT,
            DocumentType::Other(name) => name,
        }
    }

    /// Log group the service writes this document's output to.
    pub fn log_group(&self) -> String {
        format!("/aws/ssm/{}", self.name())
    }

    /// The document segment of a log stream name.
    ///
    /// The service lower-cases the first letter after the `AWS-` prefix,
    /// so `AWS-RunShellScript` streams live under `aws-runShellScript`.
    pub fn stream_segment(&self) -> String {
        let name = self.name();
        match name.split_once('-') {
            Some((prefix, rest)) => {
                let mut chars = rest.chars();
                let head: String =
                    chars.next().map(|c| c.to_lowercase().collect()).unwrap_or_default();
                format!("{}-{}{}", prefix.to_lowercase(), head, chars.as_str())
            }
            None => name.to_lowercase(),
        }
    }

    /// Whether a command under this document can run on `platform`.
    pub fn supports(&self, platform: &Platform) -> bool {
        match (self, platform) {
            (DocumentType::ShellScript, Platform::Linux) => true,
            (DocumentType::PowerShellScript, Platform::Windows) => true,
            // Unrecognized platforms are never flagged as a mismatch
            (_, Platform::Other(_)) => true,
            _ => false,
        }
    }
}

impl From<String> for DocumentType {
    fn from(name: String) -> Self {
        DocumentType::from_name(&name)
    }
}

impl From<DocumentType> for String {
    fn from(doc: DocumentType) -> Self {
        doc.name().to_string()
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
