//! Parsed HCL document and top-level block extraction.
//!
//! Parsing and rendering go through `hcl-edit`, which keeps every token's
//! surrounding whitespace and comments as decor. For `\n`-terminated input,
//! rendering a body that was not structurally changed reproduces the input
//! byte for byte. Line terminators between top-level structures are always
//! rendered as `\n`, so CRLF sources must be converted before parsing.

use hcl_edit::Decorate;
use hcl_edit::parser;
use hcl_edit::structure::{Body, Structure};
use std::fmt;

/// One configuration file's syntax tree.
#[derive(Debug, Clone)]
pub struct Document {
    body: Body,
}

/// Outcome of [`Document::extract_blocks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extraction {
    pub removed: usize,
}

impl Extraction {
    #[inline]
    pub fn modified(&self) -> bool {
        self.removed > 0
    }
}

impl Document {
    pub fn parse(source: &str) -> Result<Self, parser::Error> {
        parser::parse_body(source).map(|body| Self { body })
    }

    /// Removes every top-level block whose identifier equals `kind`.
    ///
    /// Matching is exact and case-sensitive; nested blocks are never
    /// candidates. Positions are collected before anything is removed and
    /// then dropped back to front, so adjacent matches are all seen once.
    ///
    /// Only the comments directly above a removed block go with it. Anything
    /// separated from the block by a blank line is handed to the next
    /// structure, or to the end of the document.
    pub fn extract_blocks(&mut self, kind: &str) -> Extraction {
        let matches: Vec<usize> = self
            .body
            .iter()
            .enumerate()
            .filter_map(|(index, structure)| match structure {
                Structure::Block(block) if block.ident.value().as_str() == kind => Some(index),
                _ => None,
            })
            .collect();

        for &index in matches.iter().rev() {
            let removed = self.body.remove(index);
            let prefix = removed.decor().prefix().map(|raw| raw.to_string());
            let detached = prefix.as_deref().map(detached_prefix).unwrap_or_default();
            if !detached.is_empty() {
                self.reattach(index, detached);
            }
        }

        if !matches.is_empty() {
            tracing::debug!("Removed {} top-level '{}' blocks", matches.len(), kind);
        }

        Extraction {
            removed: matches.len(),
        }
    }

    // `index` is where the removed structure used to be, which is now the
    // structure that followed it.
    fn reattach(&mut self, index: usize, detached: &str) {
        match self.body.get_mut(index) {
            Some(next) => {
                let decor = next.decor_mut();
                let rest = decor.prefix().map(|raw| raw.to_string()).unwrap_or_default();
                decor.set_prefix(format!("{}{}", detached, rest));
            }
            None => {
                let decor = self.body.decor_mut();
                let rest = decor.suffix().map(|raw| raw.to_string()).unwrap_or_default();
                decor.set_suffix(format!("{}{}", detached, rest));
            }
        }
    }

    /// Identifiers of the top-level blocks, in document order.
    pub fn block_kinds(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(|structure| match structure {
            Structure::Block(block) => Some(block.ident.value().as_str()),
            Structure::Attribute(_) => None,
        })
    }

    /// Number of top-level attributes and blocks.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn render(&self) -> String {
        self.body.to_string()
    }
}

/// The part of a removed block's prefix that belongs to the surrounding
/// file: everything before its last blank line. Comment lines after that
/// blank line lead the block and are dropped along with it.
fn detached_prefix(prefix: &str) -> &str {
    let mut offset = 0;
    let mut cut = 0;
    for line in prefix.split_inclusive('\n') {
        if line.ends_with('\n') && line.trim().is_empty() {
            cut = offset;
        }
        offset += line.len();
    }
    &prefix[..cut]
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = r#"resource "aws_instance" "web" {
  ami           = "ami-123456"
  instance_type = "t2.micro"
}

moved {
  from = aws_instance.old
  to   = aws_instance.web
}

resource "aws_s3_bucket" "data" {
  bucket = "my-bucket"
}

moved {
  from = aws_s3_bucket.logs
  to   = aws_s3_bucket.data
}
"#;

    fn kinds(doc: &Document) -> Vec<&str> {
        doc.block_kinds().collect()
    }

    #[test]
    fn test_untouched_document_renders_identically() {
        let source = "# header\nlocals {\n  a = 1 # trailing\n}\n\n\nvariable \"x\" {}\n";
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.render(), source);
    }

    #[test]
    fn test_removes_interleaved_blocks() {
        let mut doc = Document::parse(MIXED).unwrap();
        let extraction = doc.extract_blocks("moved");

        assert_eq!(extraction.removed, 2);
        assert!(extraction.modified());
        assert_eq!(kinds(&doc), vec!["resource", "resource"]);

        let rendered = doc.render();
        assert!(!rendered.contains("moved"));
        assert!(rendered.contains(r#"resource "aws_instance" "web""#));
        assert!(rendered.contains(r#"bucket = "my-bucket""#));
    }

    #[test]
    fn test_adjacent_matches_are_all_removed() {
        let source = "moved {\n  from = a.b\n  to = a.c\n}\nmoved {\n  from = a.c\n  to = a.d\n}\nmoved {\n  from = a.d\n  to = a.e\n}\n";
        let mut doc = Document::parse(source).unwrap();

        assert_eq!(doc.extract_blocks("moved").removed, 3);
        assert!(doc.is_empty());
        assert!(doc.render().trim().is_empty());
    }

    #[test]
    fn test_preserves_relative_order_of_other_nodes() {
        let source = "a = 1\nmoved {}\nlocals {}\nb = 2\nmoved {}\noutput \"o\" {\n  value = 1\n}\n";
        let mut doc = Document::parse(source).unwrap();
        doc.extract_blocks("moved");

        assert_eq!(doc.len(), 4);
        assert_eq!(kinds(&doc), vec!["locals", "output"]);
        let rendered = doc.render();
        let a = rendered.find("a = 1").unwrap();
        let locals = rendered.find("locals").unwrap();
        let b = rendered.find("b = 2").unwrap();
        let output = rendered.find("output").unwrap();
        assert!(a < locals && locals < b && b < output);
    }

    #[test]
    fn test_nested_blocks_are_not_candidates() {
        let source = "module \"m\" {\n  moved {\n    from = a.b\n    to   = a.c\n  }\n}\n";
        let mut doc = Document::parse(source).unwrap();

        assert_eq!(doc.extract_blocks("moved"), Extraction::default());
        assert_eq!(doc.render(), source);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let source = "Moved {}\nmoved_block {}\n";
        let mut doc = Document::parse(source).unwrap();

        assert_eq!(doc.extract_blocks("moved").removed, 0);
        assert_eq!(kinds(&doc), vec!["Moved", "moved_block"]);
    }

    #[test]
    fn test_commented_blocks_are_inert() {
        let source = "resource \"a\" \"b\" {}\n\n# moved {\n#   from = a.old\n#   to   = a.b\n# }\n";
        let mut doc = Document::parse(source).unwrap();

        assert_eq!(doc.extract_blocks("moved").removed, 0);
        assert_eq!(doc.render(), source);
    }

    #[test]
    fn test_section_comment_above_blank_line_survives_removal() {
        let source = "resource \"a\" \"b\" {}\n\n# ---- Outputs ----\n\nmoved {\n  from = a.old\n  to   = a.b\n}\n\noutput \"x\" {\n  value = 1\n}\n";
        let mut doc = Document::parse(source).unwrap();

        assert_eq!(doc.extract_blocks("moved").removed, 1);
        assert_eq!(
            doc.render(),
            "resource \"a\" \"b\" {}\n\n# ---- Outputs ----\n\noutput \"x\" {\n  value = 1\n}\n"
        );
    }

    #[test]
    fn test_lead_comment_goes_with_removed_block() {
        let source = "a = 1\n\n# rename of the web instance\nmoved {\n  from = a.old\n  to   = a.b\n}\nb = 2\n";
        let mut doc = Document::parse(source).unwrap();
        doc.extract_blocks("moved");

        let rendered = doc.render();
        assert!(!rendered.contains("rename of the web instance"));
        assert!(rendered.contains("a = 1"));
        assert!(rendered.contains("b = 2"));
    }

    #[test]
    fn test_footer_comment_survives_removal_of_last_block() {
        let source = "a = 1\n\n# end of file\n\nmoved {}\n";
        let mut doc = Document::parse(source).unwrap();

        assert_eq!(doc.extract_blocks("moved").removed, 1);
        assert_eq!(doc.render(), "a = 1\n\n# end of file\n");
    }

    #[test]
    fn test_detached_prefix_splits_at_last_blank_line() {
        assert_eq!(detached_prefix(""), "");
        assert_eq!(detached_prefix("\n"), "");
        assert_eq!(detached_prefix("# lead\n"), "");
        assert_eq!(detached_prefix("\n# section\n\n"), "\n# section\n");
        assert_eq!(detached_prefix("# one\n\n# two\n\n# lead\n"), "# one\n\n# two\n");
    }

    #[test]
    fn test_kind_is_generic() {
        let mut doc = Document::parse(MIXED).unwrap();
        assert_eq!(doc.extract_blocks("resource").removed, 2);
        assert_eq!(kinds(&doc), vec!["moved", "moved"]);
    }

    #[test]
    fn test_empty_document() {
        let mut doc = Document::parse("").unwrap();
        assert_eq!(doc.extract_blocks("moved").removed, 0);
        assert_eq!(doc.render(), "");
    }

    #[test]
    fn test_invalid_source_fails_to_parse() {
        assert!(Document::parse("this is not valid HCL").is_err());
    }
}
