use unicode_normalization::char::is_combining_mark;
use unicode_segmentation::UnicodeSegmentation;

/// Unique document identifier, assigned by the caller
pub type DocumentId = u64;

/// A document as seen by the indexer: a token stream plus its size
///
/// `size` counts every token, punctuation included, and drives the
/// coarse length bucket stored with each posting.
pub trait IndexableDocument {
    fn tokens(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Plain text document segmented on Unicode word boundaries
///
/// Word boundary segments are further split at inner punctuation, so
/// "doesn't" yields "doesn", "'" and "t". Periods and commas stay inside
/// a segment only between two digits.
#[derive(Clone, Debug)]
pub struct TextDocument {
    text: String,
    size: usize,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let size = Self::segments(&text).count();
        Self { text, size }
    }

    fn segments(text: &str) -> impl Iterator<Item = &str> {
        text.split_word_bounds()
            .filter(|segment| !segment.chars().all(char::is_whitespace))
            .flat_map(split_inner_punctuation)
    }
}

fn split_inner_punctuation(segment: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = segment.char_indices().collect();
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        let joins = c.is_alphanumeric()
            || (start.is_some() && is_combining_mark(c))
            || (start.is_some() && is_decimal_separator(&chars, i));
        if joins {
            start.get_or_insert(pos);
            continue;
        }
        if let Some(from) = start.take() {
            tokens.push(&segment[from..pos]);
        }
        tokens.push(&segment[pos..pos + c.len_utf8()]);
    }
    if let Some(from) = start {
        tokens.push(&segment[from..]);
    }
    tokens
}

/// `.` or `,` with a digit on either side
fn is_decimal_separator(chars: &[(usize, char)], i: usize) -> bool {
    let is_digit = |j: usize| chars.get(j).is_some_and(|&(_, c)| c.is_numeric());
    matches!(chars[i].1, '.' | ',') && i > 0 && is_digit(i - 1) && is_digit(i + 1)
}

impl IndexableDocument for TextDocument {
    fn tokens(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(Self::segments(&self.text))
    }

    fn size(&self) -> usize {
        self.size
    }
}

impl From<&str> for TextDocument {
    fn from(text: &str) -> Self {
        TextDocument::new(text)
    }
}
