//! Static risk classification of host-language standard modules.
//!
//! Every identifier maps to exactly one tier. Identifiers missing from the
//! table are unclassified: `tier_of` returns `None` for them and no tier
//! query includes them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use RiskTier::{Blocked, Monitor, Normal, Risk};

/// Risk tier of an importable module, ordered from inert to blocked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
    /// Inert; worth observing but harmless.
    Monitor = 0,
    /// Works normally inside the sandbox.
    Normal = 1,
    /// Has risky behaviors (introspection, code loading).
    Risk = 2,
    /// Reaches the filesystem, network or processes; keep out.
    Blocked = 3,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [Monitor, Normal, Risk, Blocked];

    pub fn from_level(level: u8) -> Option<RiskTier> {
        RiskTier::ALL.get(usize::from(level)).copied()
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Monitor => "monitor",
            Normal => "normal",
            Risk => "risk",
            Blocked => "blocked",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized tier name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk tier `{0}` (expected monitor, normal, risk, blocked or 0-3)")]
pub struct UnknownTier(pub String);

impl FromStr for RiskTier {
    type Err = UnknownTier;

    /// Accepts a tier name (any case) or its level digit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Ok(level) = lowered.parse::<u8>() {
            return RiskTier::from_level(level).ok_or_else(|| UnknownTier(s.to_string()));
        }
        RiskTier::ALL
            .into_iter()
            .find(|tier| tier.name() == lowered)
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

static MODULE_TIERS: &[(&str, RiskTier)] = &[
    ("string", Normal),
    ("re", Risk),
    ("difflib", Normal),
    ("textwrap", Normal),
    ("unicodedata", Normal),
    ("stringprep", Normal),
    ("readline", Normal),
    ("rlcompleter", Normal),
    ("struct", Risk),
    ("codecs", Risk),
    ("datetime", Normal),
    ("zoneinfo", Normal),
    ("calendar", Normal),
    ("collections", Normal),
    ("collections.abc", Normal),
    ("heapq", Normal),
    ("bisect", Normal),
    ("array", Normal),
    ("weakref", Normal),
    ("types", Risk),
    ("copy", Risk),
    ("pprint", Normal),
    ("reprlib", Normal),
    ("enum", Normal),
    ("graphlib", Normal),
    ("numbers", Normal),
    ("math", Normal),
    ("cmath", Normal),
    ("decimal", Normal),
    ("fractions", Normal),
    ("random", Normal),
    ("statistics", Normal),
    ("itertools", Normal),
    ("functools", Normal),
    ("operator", Normal),
    ("pathlib", Blocked),
    ("os.path", Blocked),
    ("stat", Blocked),
    ("filecmp", Blocked),
    ("tempfile", Blocked),
    ("glob", Blocked),
    ("fnmatch", Blocked),
    ("linecache", Normal),
    ("shutil", Blocked),
    ("pickle", Risk),
    ("copyreg", Risk),
    ("shelve", Risk),
    ("marshal", Risk),
    ("dbm", Blocked),
    ("sqlite3", Blocked),
    ("zlib", Normal),
    ("gzip", Normal),
    ("bz2", Normal),
    ("lzma", Normal),
    ("zipfile", Blocked),
    ("tarfile", Blocked),
    ("csv", Normal),
    ("configparser", Normal),
    ("tomllib", Normal),
    ("netrc", Normal),
    ("plistlib", Normal),
    ("hashlib", Normal),
    ("hmac", Normal),
    ("secrets", Normal),
    ("os", Blocked),
    ("io", Blocked),
    ("time", Normal),
    ("logging", Normal),
    ("logging.config", Normal),
    ("logging.handlers", Normal),
    ("platform", Normal),
    ("errno", Normal),
    ("ctypes", Blocked),
    ("argparse", Normal),
    ("optparse", Normal),
    ("getpass", Normal),
    ("fileinput", Normal),
    ("curses", Normal),
    ("curses.textpad", Normal),
    ("curses.ascii", Normal),
    ("curses.panel", Normal),
    ("threading", Risk),
    ("multiprocessing", Blocked),
    ("multiprocessing.shared_memory", Blocked),
    ("concurrent", Risk),
    ("concurrent.futures", Risk),
    ("subprocess", Blocked),
    ("sched", Normal),
    ("queue", Normal),
    ("contextvars", Normal),
    ("_thread", Risk),
    ("asyncio", Blocked),
    ("socket", Blocked),
    ("ssl", Blocked),
    ("select", Blocked),
    ("selectors", Blocked),
    ("signal", Blocked),
    ("mmap", Blocked),
    ("email", Normal),
    ("json", Normal),
    ("mailbox", Normal),
    ("mimetypes", Normal),
    ("base64", Normal),
    ("binascii", Normal),
    ("quopri", Normal),
    ("html", Normal),
    ("html.parser", Normal),
    ("html.entities", Normal),
    ("xml.etree.ElementTree", Normal),
    ("xml.dom", Normal),
    ("xml.dom.minidom", Normal),
    ("xml.dom.pulldom", Normal),
    ("xml.sax", Normal),
    ("xml.sax.handler", Normal),
    ("xml.sax.saxutils", Normal),
    ("xml.sax.xmlreader", Normal),
    ("xml.parsers.expat", Normal),
    ("webbrowser", Normal),
    ("wsgiref", Normal),
    ("urllib", Blocked),
    ("urllib.request", Blocked),
    ("urllib.response", Normal),
    ("urllib.parse", Normal),
    ("urllib.error", Normal),
    ("urllib.robotparser", Normal),
    ("http", Blocked),
    ("http.client", Blocked),
    ("ftplib", Blocked),
    ("poplib", Blocked),
    ("imaplib", Blocked),
    ("smtplib", Blocked),
    ("uuid", Normal),
    ("socketserver", Blocked),
    ("http.server", Blocked),
    ("http.cookies", Normal),
    ("http.cookiejar", Normal),
    ("xmlrpc", Blocked),
    ("xmlrpc.client", Blocked),
    ("xmlrpc.server", Blocked),
    ("ipaddress", Normal),
    ("wave", Normal),
    ("colorsys", Normal),
    ("gettext", Normal),
    ("locale", Normal),
    ("turtle", Normal),
    ("cmd", Normal),
    ("shlex", Normal),
    ("tkinter", Normal),
    ("tkinter.colorchooser", Normal),
    ("tkinter.font", Normal),
    ("tkinter.messagebox", Normal),
    ("tkinter.scrolledtext", Normal),
    ("tkinter.dnd", Normal),
    ("tkinter.ttk", Normal),
    ("typing", Normal),
    ("pydoc", Normal),
    ("doctest", Normal),
    ("unittest", Normal),
    ("unittest.mock", Normal),
    ("test", Normal),
    ("test.support", Normal),
    ("test.support.socket_helper", Normal),
    ("test.support.script_helper", Normal),
    ("test.support.bytecode_helper", Normal),
    ("test.support.threading_helper", Normal),
    ("test.support.os_helper", Normal),
    ("test.support.import_helper", Normal),
    ("test.support.warnings_helper", Normal),
    ("bdb", Normal),
    ("faulthandler", Normal),
    ("pdb", Normal),
    ("timeit", Normal),
    ("trace", Normal),
    ("tracemalloc", Normal),
    ("ensurepip", Normal),
    ("venv", Normal),
    ("zipapp", Normal),
    ("sys", Risk),
    ("sys.monitoring", Risk),
    ("sysconfig", Normal),
    ("builtins", Monitor),
    ("warnings", Normal),
    ("dataclasses", Normal),
    ("contextlib", Normal),
    ("abc", Normal),
    ("atexit", Normal),
    ("traceback", Risk),
    ("gc", Normal),
    ("inspect", Risk),
    ("site", Normal),
    ("code", Risk),
    ("codeop", Risk),
    ("zipimport", Risk),
    ("pkgutil", Risk),
    ("modulefinder", Risk),
    ("runpy", Risk),
    ("importlib", Risk),
    ("importlib.resources", Risk),
    ("importlib.resources.abc", Risk),
    ("importlib.metadata", Risk),
    ("ast", Normal),
    ("symtable", Normal),
    ("token", Normal),
    ("keyword", Normal),
    ("tokenize", Normal),
    ("tabnanny", Normal),
    ("pyclbr", Normal),
    ("py_compile", Normal),
    ("compileall", Normal),
    ("dis", Normal),
    ("pickletools", Normal),
    ("msvcrt", Normal),
    ("winreg", Blocked),
    ("winsound", Normal),
    ("posix", Blocked),
    ("pwd", Blocked),
    ("grp", Blocked),
    ("termios", Blocked),
    ("tty", Blocked),
    ("pty", Blocked),
    ("fcntl", Blocked),
    ("resource", Blocked),
    ("syslog", Blocked),
];

/// Tier of a module identifier, or `None` when it is unclassified.
pub fn tier_of(module: &str) -> Option<RiskTier> {
    MODULE_TIERS
        .iter()
        .find(|(name, _)| *name == module)
        .map(|(_, tier)| *tier)
}

/// Every module identifier classified at `tier`.
pub fn modules_at(tier: RiskTier) -> BTreeSet<&'static str> {
    MODULE_TIERS
        .iter()
        .filter(|(_, t)| *t == tier)
        .map(|(name, _)| *name)
        .collect()
}
