//! Snapshot helpers for painted engine frames.

use crate::render::RenderFrame;

/// Assert a stable text snapshot for a render frame.
///
/// `expected` may include a trailing newline; it will be trimmed for comparison.
pub fn assert_render_frame_snapshot(label: &str, frame: &RenderFrame, expected: &str) {
    let expected = expected.trim_end_matches('\n');
    let got = frame.snapshot();
    assert_eq!(
        got, expected,
        "render frame snapshot mismatch ({label})\n--- expected\n{expected}\n--- got\n{got}",
    );
}

/// Like [`assert_render_frame_snapshot`] but compares row text with trailing
/// blanks removed, so expectations do not need to spell out padding.
pub fn assert_trimmed_snapshot(label: &str, frame: &RenderFrame, expected: &str) {
    let expected = expected.trim_end_matches('\n');
    let got = frame.trimmed_snapshot();
    assert_eq!(
        got, expected,
        "trimmed snapshot mismatch ({label})\n--- expected\n{expected}\n--- got\n{got}",
    );
}
