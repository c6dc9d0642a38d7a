//! Shell command policy
//!
//! Two independent layers. The allow-list only decides whether a command is
//! routine enough to skip the approval prompt. The deny-list is scanned
//! unconditionally before every spawn, even for approved commands, and any
//! hit aborts. The scan is deliberately coarse substring matching; shell
//! grammar is not parsed here.

/// Base commands that run without prompting: interpreters, package
/// managers, version control, and read-only utilities.
pub const ALLOWED_COMMANDS: &[&str] = &[
    // interpreters
    "python", "python3", "node", "deno", "ruby",
    // package managers and build tools
    "pip", "pip3", "npm", "npx", "yarn", "cargo", "make",
    // version control
    "git",
    // read-only utilities
    "ls", "cat", "pwd", "echo", "which", "env", "date", "grep", "find", "head", "tail",
    "wc", "sort", "uniq", "diff", "file", "stat", "du", "df", "tree",
];

/// Substrings that abort a command outright. Matched against the raw
/// command text after approval, before spawning.
pub const DENIED_PATTERNS: &[&str] = &[
    // destructive deletion
    "rm -rf /", "rm -fr /", "rm -rf ~", "rm -rf *",
    // fork bomb
    ":(){",
    // raw device writes and filesystem creation
    "dd if=", "mkfs",
    // privileged files
    "/etc/passwd", "/etc/shadow", "/etc/sudoers",
    // privilege escalation and permission blowout
    "sudo ", "chmod 777", "chown root",
    // dynamic evaluation
    "eval ", "exec ",
    // command substitution
    "`", "$(",
    // chaining and redirection
    "&&", "||", ";", "|", ">", "<", "2>",
];

/// First whitespace token of the command, without any leading path
pub fn base_command(command: &str) -> &str {
    let first = command.split_whitespace().next().unwrap_or("");
    first.rsplit('/').next().unwrap_or(first)
}

/// Whether the base command runs without an approval prompt
pub fn is_allowed(command: &str) -> bool {
    ALLOWED_COMMANDS.contains(&base_command(command))
}

/// The first deny-list pattern the command contains, if any
pub fn find_denied_pattern(command: &str) -> Option<&'static str> {
    DENIED_PATTERNS
        .iter()
        .find(|pattern| command.contains(*pattern))
        .copied()
}
