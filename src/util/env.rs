// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use std::env;
use std::ffi::OsStr;

/// Message tracing directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MsgTracing {
    pub incoming: bool,
    pub outgoing: bool,
}

/// Retrieves the message tracing setting from the given environment variable.
///
/// Valid values: `all`, `in`, `out`. Tracing is disabled if the variable is not defined or
/// contains an invalid value.
pub fn msg_tracing_from_env<K: AsRef<OsStr>>(key: K) -> MsgTracing {
    msg_tracing_from_str(env::var(key).unwrap_or_default().as_str())
}

fn msg_tracing_from_str(value: &str) -> MsgTracing {
    match value.trim().to_lowercase().as_str() {
        "all" => MsgTracing {
            incoming: true,
            outgoing: true,
        },
        "in" => MsgTracing {
            incoming: true,
            outgoing: false,
        },
        "out" => MsgTracing {
            incoming: false,
            outgoing: true,
        },
        _ => MsgTracing::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("all", true, true)]
    #[case("ALL", true, true)]
    #[case("in", true, false)]
    #[case("out", false, true)]
    #[case("none", false, false)]
    #[case("", false, false)]
    fn msg_tracing_values(#[case] value: &str, #[case] incoming: bool, #[case] outgoing: bool) {
        assert_eq!(
            MsgTracing { incoming, outgoing },
            msg_tracing_from_str(value)
        );
    }
}
