//! Line assembly across read boundaries.
//!
//! Capture output arrives in arbitrary chunks; a line may be split across
//! two reads or several lines may arrive in one. The assembler splits on
//! newline and retains any trailing partial line for the next chunk.

/// Stateful splitter for a byte stream read in chunks.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns the complete lines it finished.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.partial.push_str(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.find('\n') {
            let mut line: String = self.partial.drain(..=pos).collect();
            line.pop(); // trailing '\n'
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Whatever is left after the stream ends.
    pub fn remainder(self) -> Option<String> {
        if self.partial.is_empty() {
            None
        } else {
            Some(self.partial)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_lines_pass_through() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.push("a|b|c\n"), vec!["a|b|c"]);
    }

    #[test]
    fn line_split_across_chunks_is_reassembled() {
        let mut assembler = LineAssembler::new();
        assert!(assembler.push("1700000000.0|185.220").is_empty());
        assert_eq!(
            assembler.push(".101.1|8.8.8.8\n"),
            vec!["1700000000.0|185.220.101.1|8.8.8.8"]
        );
    }

    #[test]
    fn multiple_lines_in_one_chunk() {
        let mut assembler = LineAssembler::new();
        assert_eq!(
            assembler.push("one\ntwo\nthr"),
            vec!["one".to_string(), "two".to_string()]
        );
        assert_eq!(assembler.push("ee\n"), vec!["three"]);
    }

    #[test]
    fn crlf_is_normalized() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.push("a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn remainder_surfaces_trailing_partial() {
        let mut assembler = LineAssembler::new();
        assembler.push("complete\npart");
        assert_eq!(assembler.remainder().as_deref(), Some("part"));

        let mut assembler = LineAssembler::new();
        assembler.push("complete\n");
        assert_eq!(assembler.remainder(), None);
    }
}
