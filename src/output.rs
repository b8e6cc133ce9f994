//! CLI output formatting.
//!
//! The CLI writes image bytes to a file or stdout, so human-readable
//! reporting goes to stderr. Each outcome prints a header line followed by
//! indented detail lines:
//!
//! ```text
//! resize photo.jpg → out.png
//!     Size: 100x75
//!     Format: png
//!     Quality: 80
//!     Bytes: 10342
//! ```
//!
//! Failures print the error kind alongside the message:
//!
//! ```text
//! resize photo.jpg failed
//!     NotFound: image file not found: photo.jpg
//! ```

use crate::error::WandError;
use crate::imaging::ImageOutput;

const INDENT: &str = "    ";

/// Lines describing a successful operation.
pub fn format_success(
    operation: &str,
    source: &str,
    dest: &str,
    output: &ImageOutput,
) -> Vec<String> {
    let info = &output.info;
    let mut lines = vec![
        format!("{operation} {source} → {dest}"),
        format!("{INDENT}Size: {}x{}", info.width, info.height),
    ];
    if let Some(format) = &info.format {
        lines.push(format!("{INDENT}Format: {format}"));
    }
    if let Some(quality) = info.quality {
        lines.push(format!("{INDENT}Quality: {quality}"));
    }
    lines.push(format!("{INDENT}Bytes: {}", output.data.len()));
    lines
}

/// Lines describing a failed operation.
pub fn format_failure(operation: &str, source: &str, err: &WandError) -> Vec<String> {
    vec![
        format!("{operation} {source} failed"),
        format!("{INDENT}{}: {err}", err.kind()),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ImageInfo;

    fn output(quality: Option<u8>) -> ImageOutput {
        ImageOutput {
            data: vec![0; 42],
            info: ImageInfo {
                width: 100,
                height: 75,
                quality,
                format: Some("png".into()),
            },
        }
    }

    #[test]
    fn success_lists_size_format_and_bytes() {
        let lines = format_success("resize", "photo.jpg", "out.png", &output(None));
        assert_eq!(
            lines,
            vec![
                "resize photo.jpg → out.png",
                "    Size: 100x75",
                "    Format: png",
                "    Bytes: 42",
            ]
        );
    }

    #[test]
    fn success_includes_quality_when_applied() {
        let lines = format_success("thumbnail", "-", "-", &output(Some(80)));
        assert!(lines.contains(&"    Quality: 80".to_string()));
    }

    #[test]
    fn failure_shows_kind_and_message() {
        let err = WandError::NotFound("photo.jpg".into());
        let lines = format_failure("resize", "photo.jpg", &err);
        assert_eq!(lines[0], "resize photo.jpg failed");
        assert_eq!(lines[1], "    NotFound: image file not found: photo.jpg");
    }
}
