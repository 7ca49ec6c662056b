#[cfg(feature = "color")]
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

///
/// Picks the candidate closest to `actual`, if there is any.
///
pub(crate) fn closest<'a, I>(actual: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| {
            let ratio = TextDiff::from_chars(candidate, actual).ratio();
            (candidate, ratio)
        })
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(candidate, _)| candidate)
}

///
/// Renders a word-level diff between `expected` and `actual`. Removed words are shown as
/// `[-word-]` and added words as `{+word+}`, or in red and green when `color` is set and the
/// `color` feature is enabled.
///
pub(crate) fn compare(expected: &str, actual: &str, color: bool) -> String {
    let diff = TextDiff::from_words(expected, actual);

    diff.iter_all_changes()
        .map(|change| {
            if color {
                highlight(change.value(), change.tag())
            } else {
                mark(change.value(), change.tag())
            }
        })
        .collect()
}

fn mark(value: &str, tag: ChangeTag) -> String {
    match tag {
        ChangeTag::Equal => value.to_string(),
        ChangeTag::Delete => format!("[-{}-]", value),
        ChangeTag::Insert => format!("{{+{}+}}", value),
    }
}

#[cfg(feature = "color")]
fn highlight(value: &str, tag: ChangeTag) -> String {
    match tag {
        ChangeTag::Equal => value.to_string(),
        ChangeTag::Delete => value.red().to_string(),
        ChangeTag::Insert => value.bright_green().to_string(),
    }
}

#[cfg(not(feature = "color"))]
fn highlight(value: &str, tag: ChangeTag) -> String {
    mark(value, tag)
}
