//! Detection and extraction of protocol messages embedded in console output.
//!
//! The remote session smuggles structured messages through its console
//! stream as ordinary-looking text lines. A message line is the session's
//! rendering of a JSON-encoded string wrapped in fixed header/footer
//! tokens, so the header/footer appear twice on the wire: once in the
//! plaintext prefix/terminator and once inside the encoded string.
//!
//! Two framings exist, differing only in the marker before the opening
//! quote: the auto-printed form (`[1] "` index marker) and the bare form
//! (a single leading space). Everything else is plain output, including
//! lines that merely resemble a framing.

use serde_json::Value;

/// Header token wrapping the payload inside the encoded string.
pub const HEADER: &str = "|$($|";
/// Footer token closing the payload inside the encoded string.
pub const FOOTER: &str = "|$)$|";

/// Every embedded line ends with the footer followed by the closing quote.
const TERMINATOR: &str = "|$)$|\"";
/// Auto-printed framing: result index marker, opening quote, header.
const PREFIX_AUTOPRINT: &str = "[1] \"|$($|";
/// Bare framing: leading space, opening quote, header.
const PREFIX_BARE: &str = " \"|$($|";

/// The two recognized line framings for an embedded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `[1] "..."` — the session auto-printed the message string.
    AutoPrint,
    /// ` "..."` — the message string without the result index.
    Bare,
}

/// Outcome of framing a single console line.
#[derive(Debug, Clone, PartialEq)]
pub enum FramedLine {
    /// The line carried an embedded message; this is its decoded payload.
    Embedded(Value),
    /// Ordinary program output.
    Plain,
}

/// Classify one line of console output and extract the embedded payload
/// if there is one.
///
/// A line qualifies only if it ends with the fixed terminator AND starts
/// with one of the two recognized prefixes; the auto-print prefix is
/// checked first since it is the marker-bearing, more specific one. Any
/// decode failure past detection degrades to plain output: a malformed
/// lookalike must never take down the poll loop, and misclassifying it
/// as output is the safe direction.
pub fn frame_line(line: &str) -> FramedLine {
    if !line.ends_with(TERMINATOR) {
        return FramedLine::Plain;
    }

    let body = if let Some(rest) = line.strip_prefix(PREFIX_AUTOPRINT) {
        rest
    } else if let Some(rest) = line.strip_prefix(PREFIX_BARE) {
        rest
    } else {
        // Terminator without a known start marker: ambiguous, treat as
        // plain output rather than guessing at a framing.
        tracing::warn!("Line ends with message terminator but matches no framing: {line}");
        return FramedLine::Plain;
    };

    // The matched prefix consumed the opening quote, so restore it; the
    // remainder of the line is the tail of a JSON string literal.
    let inner: String = match serde_json::from_str(&format!("\"{body}")) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!("Embedded message is not a valid string literal ({e}): {line}");
            return FramedLine::Plain;
        }
    };

    let payload = match inner
        .strip_prefix(HEADER)
        .and_then(|s| s.strip_suffix(FOOTER))
    {
        Some(p) => p,
        None => {
            tracing::debug!("Embedded string missing inner header/footer: {line}");
            return FramedLine::Plain;
        }
    };

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => FramedLine::Embedded(value),
        Err(e) => {
            tracing::debug!("Embedded payload is not valid JSON ({e}): {line}");
            FramedLine::Plain
        }
    }
}

/// Encode a payload into an embedded message line, the exact inverse of
/// [`frame_line`]. Used by tests and by tooling that fakes a session.
pub fn encode_line(payload: &Value, framing: Framing) -> String {
    let inner = format!("{HEADER}{payload}{FOOTER}");
    let literal = Value::String(inner).to_string();
    // Drop the literal's opening quote; the prefix carries its own.
    let body = &literal[1..];
    match framing {
        Framing::AutoPrint => format!("{PREFIX_AUTOPRINT}{body}"),
        Framing::Bare => format!("{PREFIX_BARE}{body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval_start_payload() -> Value {
        json!({"type": "evalStart", "session": "s1", "data": "ln1"})
    }

    // ===========================================
    // Detection tests
    // ===========================================

    #[test]
    fn test_plain_line_is_plain() {
        assert_eq!(frame_line("hello world"), FramedLine::Plain);
    }

    #[test]
    fn test_empty_line_is_plain() {
        assert_eq!(frame_line(""), FramedLine::Plain);
    }

    #[test]
    fn test_prefix_without_terminator_is_plain() {
        // Looks like a message start but the terminator is missing.
        let line = r#"[1] "|$($|{\"type\":\"evalStart\"}"#;
        assert_eq!(frame_line(line), FramedLine::Plain);
    }

    #[test]
    fn test_terminator_without_prefix_is_plain() {
        // Ambiguous terminator: ends correctly, starts with neither prefix.
        let line = r#"x <- "|$)$|""#;
        assert_eq!(frame_line(line), FramedLine::Plain);
    }

    #[test]
    fn test_spec_example_line_decodes() {
        // Real wire line: header/footer appear both in the plaintext
        // framing and inside the JSON-encoded string.
        let line = r#"[1] "|$($||$($|{\"type\":\"evalStart\",\"session\":\"s1\",\"data\":\"ln1\"}|$)$|""#;
        match frame_line(line) {
            FramedLine::Embedded(v) => {
                assert_eq!(v["type"], "evalStart");
                assert_eq!(v["session"], "s1");
                assert_eq!(v["data"], "ln1");
            }
            FramedLine::Plain => panic!("expected embedded message"),
        }
    }

    #[test]
    fn test_bare_framing_decodes() {
        let line = r#" "|$($||$($|{\"type\":\"docStatus\",\"session\":\"s1\",\"data\":{\"evalComplete\":true,\"nextIndex\":null}}|$)$|""#;
        match frame_line(line) {
            FramedLine::Embedded(v) => {
                assert_eq!(v["type"], "docStatus");
                assert_eq!(v["data"]["evalComplete"], true);
            }
            FramedLine::Plain => panic!("expected embedded message"),
        }
    }

    // ===========================================
    // Degradation tests
    // ===========================================

    #[test]
    fn test_invalid_string_literal_degrades_to_plain() {
        // Unescaped interior quote makes the string literal unparseable.
        let line = r#"[1] "|$($|bro"ken|$)$|""#;
        assert_eq!(frame_line(line), FramedLine::Plain);
    }

    #[test]
    fn test_missing_inner_header_degrades_to_plain() {
        // String literal parses but its value lacks the inner header.
        let line = r#"[1] "|$($|{\"type\":\"evalStart\"}|$)$|""#;
        assert_eq!(frame_line(line), FramedLine::Plain);
    }

    #[test]
    fn test_invalid_payload_json_degrades_to_plain() {
        let line = r#"[1] "|$($||$($|not json at all|$)$|""#;
        assert_eq!(frame_line(line), FramedLine::Plain);
    }

    // ===========================================
    // Round-trip tests
    // ===========================================

    #[test]
    fn test_round_trip_autoprint() {
        let payload = eval_start_payload();
        let line = encode_line(&payload, Framing::AutoPrint);
        assert!(line.starts_with(r#"[1] "|$($|"#));
        assert_eq!(frame_line(&line), FramedLine::Embedded(payload));
    }

    #[test]
    fn test_round_trip_bare() {
        let payload = json!({
            "type": "docStatus",
            "session": "s2",
            "data": {"evalComplete": false, "nextIndex": 3}
        });
        let line = encode_line(&payload, Framing::Bare);
        assert!(line.starts_with(r#" "|$($|"#));
        assert_eq!(frame_line(&line), FramedLine::Embedded(payload));
    }

    #[test]
    fn test_round_trip_payload_containing_delimiters() {
        // Delimiter tokens inside a payload string survive the trip.
        let payload = json!({"type": "print", "session": "s1", "data": "text with |$)$| inside"});
        let line = encode_line(&payload, Framing::AutoPrint);
        assert_eq!(frame_line(&line), FramedLine::Embedded(payload));
    }

    #[test]
    fn test_encoded_line_matches_spec_scenario_shape() {
        let line = encode_line(&eval_start_payload(), Framing::AutoPrint);
        // Doubled header after the index marker, terminator at the end.
        assert!(line.starts_with(r#"[1] "|$($||$($|"#));
        assert!(line.ends_with(r#"|$)$|""#));
    }
}
