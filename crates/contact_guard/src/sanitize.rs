//! Input sanitizer.
//!
//! Strips markup and script vectors from user supplied text before it is
//! validated or displayed. The transformation is deterministic and idempotent:
//! removal passes run until the text stops changing, so a construct that is
//! re-formed by an earlier removal (e.g. `<scr<script></script>ipt>`) is
//! removed as well.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `<script ...> ... </script>` including its body (non-greedy).
    static ref SCRIPT_BLOCK: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid script-block regex");
    /// `javascript:` URI schemes, tolerating whitespace before the colon.
    static ref SCRIPT_SCHEME: Regex =
        Regex::new(r"(?i)javascript\s*:").expect("valid scheme regex");
    /// Inline event handler attributes such as `onclick=`.
    static ref EVENT_HANDLER: Regex =
        Regex::new(r"(?i)\bon\w+\s*=").expect("valid event-handler regex");
    /// Any remaining tag.
    static ref MARKUP_TAG: Regex = Regex::new(r"<[^>]*>").expect("valid tag regex");
    /// Characters that are never allowed to survive.
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[<>"'&]"#).expect("valid char-class regex");
}

/// Remove unsafe markup, protocols and characters from `input`.
///
/// Never fails; empty input yields an empty string.
pub fn sanitize(input: &str) -> String {
    let mut current = input.to_owned();
    loop {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current.trim().to_owned()
}

/// Returns `true` if `sanitize` would leave the input untouched apart from
/// surrounding whitespace.
pub fn is_clean(input: &str) -> bool {
    sanitize(input) == input.trim()
}

fn strip_once(input: &str) -> String {
    let passes: [&Regex; 5] = [
        &SCRIPT_BLOCK,
        &SCRIPT_SCHEME,
        &EVENT_HANDLER,
        &MARKUP_TAG,
        &UNSAFE_CHARS,
    ];

    let mut text = input.to_owned();
    for pass in passes {
        if pass.is_match(&text) {
            text = pass.replace_all(&text, "").into_owned();
        }
    }
    text
}
