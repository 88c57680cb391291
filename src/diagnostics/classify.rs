//! Raw error classification into operator-facing reports.
//!
//! Rules are checked in order; the first match wins. MPC-specific patterns
//! come before the generic chain and network ones so that, for example, a
//! failed encrypted computation mentioning "network" is not reported as a
//! connectivity problem.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Confidential-computation (MPC) network.
    Mpc,
    Chain,
    Network,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// The raw error text.
    pub message: String,
    pub user_message: &'static str,
    pub retry: bool,
    pub details: String,
}

enum Matcher {
    Any(&'static [&'static str]),
    /// Any of the first set and none of the second.
    AnyExcept(&'static [&'static str], &'static [&'static str]),
    /// Any of the first set and any of the second.
    AnyWith(&'static [&'static str], &'static [&'static str]),
}

impl Matcher {
    fn matches(&self, text: &str) -> bool {
        let any = |patterns: &[&str]| patterns.iter().any(|p| text.contains(p));
        match self {
            Matcher::Any(hits) => any(hits),
            Matcher::AnyExcept(hits, misses) => any(hits) && !any(misses),
            Matcher::AnyWith(hits, also) => any(hits) && any(also),
        }
    }
}

enum Details {
    Fixed(&'static str),
    Simulation,
}

struct Rule {
    code: &'static str,
    kind: ErrorKind,
    matcher: Matcher,
    user_message: &'static str,
    retry: bool,
    details: Details,
}

impl Rule {
    fn report(&self, message: String) -> ErrorReport {
        let details = match self.details {
            Details::Fixed(text) => text.to_string(),
            Details::Simulation => extract_simulation_error(&message),
        };
        ErrorReport {
            kind: self.kind,
            code: Some(self.code),
            message,
            user_message: self.user_message,
            retry: self.retry,
            details,
        }
    }
}

const FAILED_TO_COMPLETE: Rule = Rule {
    code: "ProgramFailedToComplete",
    kind: ErrorKind::Mpc,
    matcher: Matcher::Any(&[
        "ProgramFailedToComplete",
        "Program failed to complete",
        "failed to complete",
    ]),
    user_message: "The encrypted computation failed to complete. ARX nodes may be unavailable on this cluster.",
    retry: true,
    details: Details::Fixed(
        "The MPC nodes could not finish the encrypted computation. ARX execution nodes are required \
         and may be offline on public clusters. Retry later or run against a localnet with ARX nodes.",
    ),
};

const RULES: &[Rule] = &[
    FAILED_TO_COMPLETE,
    Rule {
        code: "AccountNotInitialized",
        kind: ErrorKind::Mpc,
        matcher: Matcher::Any(&["AccountNotInitialized"]),
        user_message: "The MPC environment is not initialized.",
        retry: false,
        details: Details::Fixed(
            "The computation definition or MXE account needed for encrypted operations has not been initialized.",
        ),
    },
    Rule {
        code: "ComputationNotFound",
        kind: ErrorKind::Mpc,
        matcher: Matcher::Any(&["ComputationNotFound"]),
        user_message: "The encrypted computation could not be found.",
        retry: true,
        details: Details::Fixed("The computation may have expired or been dropped. Submit the transaction again."),
    },
    Rule {
        code: "InvalidComputationOffset",
        kind: ErrorKind::Mpc,
        matcher: Matcher::Any(&["InvalidComputationOffset"]),
        user_message: "Invalid computation identifier.",
        retry: true,
        details: Details::Fixed("The computation offset was rejected. This is usually transient; try again."),
    },
    Rule {
        code: "MXENotFound",
        kind: ErrorKind::Mpc,
        matcher: Matcher::Any(&["MXENotFound", "MXE account not found"]),
        user_message: "The MPC execution environment was not found.",
        retry: false,
        details: Details::Fixed("The MXE account required for encrypted operations is not deployed on this cluster."),
    },
    Rule {
        code: "ClusterNotFound",
        kind: ErrorKind::Mpc,
        matcher: Matcher::Any(&["ClusterNotFound", "cluster account"]),
        user_message: "The MPC cluster is not available.",
        retry: true,
        details: Details::Fixed("The computation cluster is not responding. Try again shortly."),
    },
    Rule {
        code: "InsufficientFunds",
        kind: ErrorKind::Chain,
        matcher: Matcher::Any(&["InsufficientFunds", "insufficient funds"]),
        user_message: "Insufficient SOL balance to complete the transaction.",
        retry: false,
        details: Details::Fixed("The fee payer needs more SOL to cover fees and rent."),
    },
    Rule {
        code: "BlockhashNotFound",
        kind: ErrorKind::Network,
        matcher: Matcher::Any(&["BlockhashNotFound"]),
        user_message: "Network congestion: the transaction expired.",
        retry: true,
        details: Details::Fixed("The blockhash expired before the transaction landed. Prepare it again and resubmit."),
    },
    Rule {
        code: "SimulationFailed",
        kind: ErrorKind::Chain,
        matcher: Matcher::Any(&["Transaction simulation failed"]),
        user_message: "The transaction would fail if submitted.",
        retry: false,
        details: Details::Simulation,
    },
    Rule {
        code: "Timeout",
        kind: ErrorKind::Network,
        matcher: Matcher::Any(&["timeout", "timed out", "not confirmed within"]),
        user_message: "Network timeout: the transaction is taking longer than expected.",
        retry: true,
        details: Details::Fixed(
            "MPC computations can take one to three minutes. The transaction may still succeed; check the explorer.",
        ),
    },
    Rule {
        code: "RateLimit",
        kind: ErrorKind::Network,
        matcher: Matcher::Any(&["429", "rate limit"]),
        user_message: "Too many requests. Wait a moment.",
        retry: true,
        details: Details::Fixed("The RPC endpoint is rate limiting requests. Wait 10 to 30 seconds and retry."),
    },
    Rule {
        code: "NetworkError",
        kind: ErrorKind::Network,
        matcher: Matcher::AnyExcept(
            &["fetch", "ECONNREFUSED", "ECONNRESET", "error sending request", "connection refused"],
            &["ProgramFailedToComplete", "computation", "MPC"],
        ),
        user_message: "Network connection issue.",
        retry: true,
        details: Details::Fixed("Unable to reach the Solana RPC endpoint. Check connectivity and try again."),
    },
    Rule {
        code: "ComputationTimeout",
        kind: ErrorKind::Mpc,
        matcher: Matcher::AnyWith(&["network"], &["computation", "MPC", "Arcium", "encrypted"]),
        user_message: "The encrypted computation timed out or failed.",
        retry: true,
        details: Details::Fixed(
            "The MPC computation did not complete in time. ARX nodes may be slow or unavailable. Try again.",
        ),
    },
];

/// Classify a raw error (JSON or free text).
pub fn classify(raw: &str) -> ErrorReport {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if value.is_object() || value.is_array() {
            let compact = value.to_string();
            if instruction_failed_to_complete(&value) || FAILED_TO_COMPLETE.matcher.matches(&compact) {
                return FAILED_TO_COMPLETE.report(compact);
            }
        }
    }

    if let Some(rule) = RULES.iter().find(|rule| rule.matcher.matches(raw)) {
        return rule.report(raw.to_string());
    }

    let details = if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    };

    ErrorReport {
        kind: ErrorKind::Unknown,
        code: None,
        message: raw.to_string(),
        user_message: "An unexpected error occurred.",
        retry: true,
        details,
    }
}

/// `{"InstructionError":[n,"...FailedToComplete"]}`
fn instruction_failed_to_complete(value: &Value) -> bool {
    value
        .get("InstructionError")
        .and_then(|ix| ix.get(1))
        .and_then(Value::as_str)
        .is_some_and(|code| code.contains("FailedToComplete"))
}

/// Pull the most useful line out of a simulation failure.
pub fn extract_simulation_error(text: &str) -> String {
    const PROGRAM_LOG: &str = "Program log: ";
    const INSTRUCTION_ERROR: &str = "InstructionError[";

    if let Some(idx) = text.find(PROGRAM_LOG) {
        let line = text[idx + PROGRAM_LOG.len()..].lines().next().unwrap_or_default();
        if !line.is_empty() {
            return line.to_string();
        }
    }

    if let Some(idx) = text.find(INSTRUCTION_ERROR) {
        let line = text[idx + INSTRUCTION_ERROR.len()..].lines().next().unwrap_or_default();
        if let Some((index, tail)) = line.split_once(',') {
            let reason = tail.rfind(']').map(|end| tail[..end].trim_start());
            if let Some(reason) = reason.filter(|r| !r.is_empty()) {
                if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                    return format!("Instruction {} failed: {}", index, reason);
                }
            }
        }
    }

    "The transaction would fail if submitted. Inspect the simulation logs for details.".to_string()
}

/// Operator suggestion for what to do next.
pub fn retry_hint(report: &ErrorReport) -> &'static str {
    if !report.retry {
        return "This issue requires intervention. Check the error details.";
    }

    match report.kind {
        ErrorKind::Mpc if report.code == Some("ProgramFailedToComplete") => {
            "ARX nodes may be temporarily unavailable on this cluster. Retry later or develop against a localnet with ARX nodes."
        }
        ErrorKind::Mpc => "MPC computations can be slow under load. Wait 30 seconds and try again.",
        ErrorKind::Network => "Network issues are usually temporary. Try again in a few moments.",
        ErrorKind::Chain => "Check the error details and try again.",
        ErrorKind::Unknown => "Try again. If the issue persists, inspect the raw error.",
    }
}

/// Log a report at error level under `context`.
pub fn log_report(report: &ErrorReport, context: &str) {
    tracing::error!(
        context,
        kind = ?report.kind,
        code = report.code.unwrap_or("none"),
        retry = report.retry,
        details = %report.details,
        raw = %report.message,
        "{}",
        report.user_message
    );
}
