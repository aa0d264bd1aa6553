//! Static log corpora used across harnesses.
//!
//! Lines are written the way ZNC's log module writes them: a `[HH:MM:SS]`
//! prefix, then either `<nick> text` or a `*** ` status line.

use backlog::{EventKind, RejectReason};

/// Channel messages, each with the sender it must yield.
pub const CORPUS_MESSAGES: &[(&str, &str)] = &[
    ("[13:05:02] <alice> hello world", "alice"),
    ("[13:05:03] <bob> <alice> quoting is fine", "bob"),
    ("[13:05:04] <carol_> ", "carol_"),
    ("[13:05:05] <d[a]ve> nick with brackets", "d[a]ve"),
    ("[13:05:06] <eve> inline *** is still a message", "eve"),
    ("[23:59:59] <frank> caf\u{e9} \u{1F980}", "frank"),
];

/// Status lines with their expected kind and subject nick.
pub const CORPUS_STATUS: &[(&str, EventKind, &str)] = &[
    ("[10:00:00] *** alice (~alice@host) joined", EventKind::Join, "alice"),
    ("[10:00:01] *** Joins: bob (~bob@host)", EventKind::Quit, "Joins:"),
    ("[10:00:02] *** carol (~carol@host) left (bye)", EventKind::Part, "carol"),
    ("[10:00:03] *** Quits: dave (~dave@host) (Ping timeout)", EventKind::Quit, "Quits:"),
    ("[10:00:04] *** (erin) joined", EventKind::Join, "erin"),
    ("[10:00:05] *** frank is now known as frankie", EventKind::Quit, "frank"),
];

/// Lines that must be rejected, with the reason.
pub const CORPUS_MALFORMED: &[(&str, RejectReason)] = &[
    ("", RejectReason::NoTimestampPrefix),
    ("no timestamp here", RejectReason::NoTimestampPrefix),
    ("[1:05:02] <alice> short hour", RejectReason::NoTimestampPrefix),
    ("[25:00:00] <alice> bad hour", RejectReason::NoTimestampPrefix),
    ("[13:05:02]<alice> no space", RejectReason::NoTimestampPrefix),
    ("[13:05:02] plain text", RejectReason::MissingSender),
    ("[13:05:02] <alice>no space", RejectReason::MissingSender),
    ("[13:05:02] <> empty", RejectReason::MissingSender),
    ("[13:05:02] ***", RejectReason::MalformedStatusLine),
    ("[13:05:02] *** ()", RejectReason::MalformedStatusLine),
];

/// `n` well-formed lines cycling through every event kind, one second apart.
pub fn corpus_high_volume(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let secs = i % 86_400;
            let ts = format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
            let nick = format!("user{}", i % 37);
            match i % 8 {
                0 => format!("[{ts}] *** {nick} (~{nick}@host) joined"),
                1 => format!("[{ts}] *** {nick} (~{nick}@host) left (later)"),
                2 => format!("[{ts}] *** Quits: {nick} (~{nick}@host) (Quit: bye)"),
                _ => format!("[{ts}] <{nick}> message number {i}"),
            }
        })
        .collect()
}
