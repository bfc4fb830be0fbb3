//! The documentation markup tree consumed by the text extractor.
//!
//! Lexing/parsing raw doc-comment source into this tree happens upstream;
//! this module only defines the tree shape and the fold that turns an
//! already-parsed tree into flat text (see DESIGN.md for the reasoning).

/// A documentation markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Empty,
    String(String),
    Paragraph(Box<Markup>),
    Append(Box<Markup>, Box<Markup>),
    Identifier(String),
    Module(String),
    Emphasis(Box<Markup>),
    Monospaced(String),
    UnorderedList(Vec<Markup>),
    OrderedList(Vec<Markup>),
    DefList(Vec<(Markup, Markup)>),
    CodeBlock(String),
    Hyperlink(String, Option<Box<Markup>>),
    Picture(String),
    AName(String),
}

/// Whether `Monospaced` spans contribute to the term stream. A default
/// `|s| <= 1` rule drops essentially all inline code, including multi-word
/// snippets, so this is configurable rather than hardcoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonospacePolicy {
    /// Never contribute monospaced text.
    DropAll,
    /// Contribute only if the span is at most this many characters long.
    KeepIfLenAtMost(usize),
}

impl Default for MonospacePolicy {
    /// Matches the source behavior of only keeping single-character spans.
    fn default() -> Self {
        MonospacePolicy::KeepIfLenAtMost(1)
    }
}

impl MonospacePolicy {
    fn keep(&self, s: &str) -> bool {
        match self {
            MonospacePolicy::DropAll => false,
            MonospacePolicy::KeepIfLenAtMost(n) => s.chars().count() <= *n,
        }
    }
}

/// Folds a [`Markup`] tree into flat text. Fragments are joined with
/// whitespace so the subsequent tokenizer sees word boundaries where the
/// tree had node boundaries.
pub fn fold_text(markup: &Markup, monospace: MonospacePolicy) -> String {
    let mut out = String::new();
    fold_into(markup, monospace, &mut out);
    out
}

fn fold_into(markup: &Markup, monospace: MonospacePolicy, out: &mut String) {
    match markup {
        Markup::Empty => {}
        Markup::String(s) => push_fragment(out, s),
        Markup::Paragraph(d) => fold_into(d, monospace, out),
        Markup::Append(a, b) => {
            fold_into(a, monospace, out);
            fold_into(b, monospace, out);
        }
        // A single token: we don't split it further here, but since it
        // normally contains no whitespace the downstream tokenizer treats
        // it as one token anyway.
        Markup::Identifier(s) => push_fragment(out, s),
        Markup::Module(_) => {}
        Markup::Emphasis(d) => fold_into(d, monospace, out),
        Markup::Monospaced(s) => {
            if monospace.keep(s) {
                push_fragment(out, s);
            }
        }
        Markup::UnorderedList(ds) | Markup::OrderedList(ds) => {
            for d in ds {
                fold_into(d, monospace, out);
            }
        }
        Markup::DefList(pairs) => {
            for (d, t) in pairs {
                fold_into(d, monospace, out);
                fold_into(t, monospace, out);
            }
        }
        Markup::CodeBlock(_) => {}
        Markup::Hyperlink(_url, label) => {
            if let Some(label) = label {
                fold_into(label, monospace, out);
            }
        }
        Markup::Picture(_) | Markup::AName(_) => {}
    }
}

fn push_fragment(out: &mut String, s: &str) {
    if s.is_empty() {
        return;
    }
    out.push_str(s);
    out.push(' ');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_module_contribute_nothing() {
        assert_eq!(fold_text(&Markup::Empty, MonospacePolicy::default()), "");
        assert_eq!(
            fold_text(&Markup::Module("Data.List".into()), MonospacePolicy::default()),
            ""
        );
    }

    #[test]
    fn append_concatenates_in_order() {
        let m = Markup::Append(
            Box::new(Markup::String("hello".into())),
            Box::new(Markup::String("world".into())),
        );
        assert_eq!(fold_text(&m, MonospacePolicy::default()), "hello world ");
    }

    #[test]
    fn monospaced_default_policy_drops_multi_char() {
        let one = Markup::Monospaced("x".into());
        let many = Markup::Monospaced("xs".into());
        assert_eq!(fold_text(&one, MonospacePolicy::default()), "x ");
        assert_eq!(fold_text(&many, MonospacePolicy::default()), "");
    }

    #[test]
    fn monospaced_drop_all_policy() {
        let one = Markup::Monospaced("x".into());
        assert_eq!(fold_text(&one, MonospacePolicy::DropAll), "");
    }

    #[test]
    fn hyperlink_without_label_contributes_nothing() {
        let m = Markup::Hyperlink("http://example.com".into(), None);
        assert_eq!(fold_text(&m, MonospacePolicy::default()), "");
    }

    #[test]
    fn hyperlink_with_label_contributes_label() {
        let m = Markup::Hyperlink(
            "http://example.com".into(),
            Some(Box::new(Markup::String("click here".into()))),
        );
        assert_eq!(fold_text(&m, MonospacePolicy::default()), "click here ");
    }

    #[test]
    fn def_list_folds_both_parts_of_every_pair() {
        let m = Markup::DefList(vec![(
            Markup::String("term".into()),
            Markup::String("definition".into()),
        )]);
        assert_eq!(fold_text(&m, MonospacePolicy::default()), "term definition ");
    }

    #[test]
    fn code_block_and_picture_contribute_nothing() {
        let code = Markup::CodeBlock("let x = 1;".into());
        let pic = Markup::Picture("diagram.png".into());
        assert_eq!(fold_text(&code, MonospacePolicy::default()), "");
        assert_eq!(fold_text(&pic, MonospacePolicy::default()), "");
    }
}
