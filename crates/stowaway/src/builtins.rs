//! Node.js built-in modules. Imports of these never map to the installed
//! tree.

use stowaway_graph::location::split_specifier;

/// e.g. `is_builtin("fs/promises")`, `is_builtin("node:test")`
pub fn is_builtin(specifier: &str) -> bool {
    if let Some(unprefixed) = specifier.strip_prefix("node:") {
        return !unprefixed.is_empty();
    }
    let (module_id, _) = split_specifier(specifier);
    BUILTIN_MODULES.contains(&specifier) || BUILTIN_MODULES.contains(&module_id)
}

/// Built-ins importable without the `node:` scheme. `node:test` and other
/// scheme-only modules are caught by the prefix check.
pub static BUILTIN_MODULES: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];
