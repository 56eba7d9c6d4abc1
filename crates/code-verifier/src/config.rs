//! Verifier configuration.

use serde::{Deserialize, Serialize};

/// A stylesheet fails integration when more than this share of its classes is unused.
pub const DEFAULT_MAX_UNUSED_CLASS_RATIO: f64 = 0.5;

/// A stylesheet declaring more classes than this fails when the markup uses none of them.
pub const DEFAULT_ZERO_USE_CLASS_LIMIT: usize = 2;

pub const DEFAULT_SOURCE_ROOT: &str = "src";

pub const DEFAULT_UNFINISHED_MARKERS: &[&str] = &["FIXME", "TODO", "XXX"];

/// Standard-library modules never reported as missing local imports.
pub const PYTHON_STDLIB: &[&str] = &[
    "__future__", "abc", "argparse", "array", "ast", "asyncio", "base64", "bisect",
    "builtins", "calendar", "collections", "concurrent", "configparser", "contextlib",
    "copy", "csv", "dataclasses", "datetime", "decimal", "difflib", "email", "enum",
    "errno", "fnmatch", "fractions", "functools", "gc", "getpass", "glob", "gzip",
    "hashlib", "heapq", "hmac", "html", "http", "importlib", "inspect", "io",
    "ipaddress", "itertools", "json", "logging", "math", "mimetypes", "multiprocessing",
    "operator", "os", "pathlib", "pickle", "platform", "pprint", "queue", "random", "re",
    "secrets", "select", "shlex", "shutil", "signal", "socket", "sqlite3", "ssl",
    "statistics", "string", "struct", "subprocess", "sys", "tempfile", "textwrap",
    "threading", "time", "timeit", "traceback", "types", "typing", "unittest", "urllib",
    "uuid", "warnings", "weakref", "xml", "zipfile", "zoneinfo",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Conventional source directory tried last when resolving references.
    pub source_root: String,
    pub max_unused_class_ratio: f64,
    pub zero_use_class_limit: usize,
    pub python_stdlib: Vec<String>,
    pub unfinished_markers: Vec<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
            max_unused_class_ratio: DEFAULT_MAX_UNUSED_CLASS_RATIO,
            zero_use_class_limit: DEFAULT_ZERO_USE_CLASS_LIMIT,
            python_stdlib: PYTHON_STDLIB.iter().map(|s| (*s).to_string()).collect(),
            unfinished_markers: DEFAULT_UNFINISHED_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl VerifierConfig {
    pub fn is_stdlib(&self, module: &str) -> bool {
        self.python_stdlib.iter().any(|m| m == module)
    }
}
