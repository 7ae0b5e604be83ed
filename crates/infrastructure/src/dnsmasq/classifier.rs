use fancy_regex::{Captures, Regex};
use std::sync::LazyLock;

// `dnsmasq[<pid>]: <serial> <client>/<port> ` as written with log-queries=extra.
// The serial plus client/port repeat on every line of one transaction and
// form its id.
const LOG_HEADER: &str = r"dnsmasq\[\d+\]: ((\d+) (\S+)/(\S+)) ";

static QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{LOG_HEADER}query\[A+\] (\S+) from"))
        .expect("query pattern is valid")
});

// forward is optional (absent when answered from cache) but repeats when
// earlier upstream servers did not respond
static FORWARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{LOG_HEADER}forwarded .+ to (.+)")).expect("forward pattern is valid")
});

static REPLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{LOG_HEADER}(?:reply|cached(?:-stale)?) .+ is (.+)"))
        .expect("reply pattern is valid")
});

const ID_GROUP: usize = 1;
const CLIENT_GROUP: usize = 3;
const FIRST_PAYLOAD_GROUP: usize = 5;

/// A dnsmasq log line, classified.
///
/// Fields borrow from the classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent<'a> {
    QueryStart {
        id: &'a str,
        client: &'a str,
        domain: &'a str,
    },
    ForwardTo {
        id: &'a str,
        server: &'a str,
    },
    ReplyFrom {
        id: &'a str,
        answer: &'a str,
    },
    Unrecognized,
}

impl<'a> LogEvent<'a> {
    pub fn is_dns_related(&self) -> bool {
        !matches!(self, LogEvent::Unrecognized)
    }

    pub fn id(&self) -> Option<&'a str> {
        match self {
            LogEvent::QueryStart { id, .. }
            | LogEvent::ForwardTo { id, .. }
            | LogEvent::ReplyFrom { id, .. } => Some(id),
            LogEvent::Unrecognized => None,
        }
    }
}

/// Classifies one log line. Never fails: anything that does not look like a
/// query, forward or reply line is `Unrecognized`.
pub fn classify_line(line: &str) -> LogEvent<'_> {
    if let Some(caps) = captures(&QUERY_RE, line) {
        return LogEvent::QueryStart {
            id: group(&caps, ID_GROUP),
            client: group(&caps, CLIENT_GROUP),
            domain: group(&caps, FIRST_PAYLOAD_GROUP),
        };
    }

    if let Some(caps) = captures(&FORWARD_RE, line) {
        return LogEvent::ForwardTo {
            id: group(&caps, ID_GROUP),
            server: group(&caps, FIRST_PAYLOAD_GROUP).trim(),
        };
    }

    if let Some(caps) = captures(&REPLY_RE, line) {
        return LogEvent::ReplyFrom {
            id: group(&caps, ID_GROUP),
            answer: group(&caps, FIRST_PAYLOAD_GROUP).trim(),
        };
    }

    LogEvent::Unrecognized
}

/// Backtrack-limit errors are treated as a non-match.
fn captures<'t>(re: &Regex, line: &'t str) -> Option<Captures<'t>> {
    re.captures(line).ok().flatten()
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map(|m| m.as_str()).unwrap_or_default()
}
