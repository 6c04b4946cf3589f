use xi_rope::Rope;

use super::span::Span;

/// A single line of the rope with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// Byte span of the line content, excluding the trailing `\n` / `\r\n`.
    pub span: Span,
    /// The line text without its line terminator.
    pub text: String,
}

impl LineRef {
    /// Byte offset of the first character of the line in the full text.
    pub fn offset(&self) -> usize {
        self.span.start
    }
}

/// Returns an iterator over lines with their byte spans.
///
/// Walks `lines_raw` so that the running offset counts every line terminator;
/// the reported spans then exclude the terminator itself.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        offset += line.len();
        let text = line.trim_end_matches(['\r', '\n']);
        LineRef {
            span: Span {
                start,
                end: start + text.len(),
            },
            text: text.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_count_newlines() {
        let rope = Rope::from("ab\ncde\n\nf");
        let lines: Vec<_> = lines_with_spans(&rope).collect();
        let offsets: Vec<_> = lines.iter().map(LineRef::offset).collect();
        assert_eq!(offsets, vec![0, 3, 7, 8]);
        assert_eq!(lines[1].text, "cde");
        assert_eq!(lines[2].span, Span::new(7, 7));
    }

    #[test]
    fn crlf_terminators_are_excluded_from_spans() {
        let rope = Rope::from("ab\r\ncd");
        let lines: Vec<_> = lines_with_spans(&rope).collect();
        assert_eq!(lines[0].span, Span::new(0, 2));
        assert_eq!(lines[1].span, Span::new(4, 6));
    }

    #[test]
    fn empty_rope_has_no_lines() {
        let rope = Rope::from("");
        assert_eq!(lines_with_spans(&rope).count(), 0);
    }
}
