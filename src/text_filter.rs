/// True when `text` is blank or any haystack contains it, ignoring case.
pub fn includes_one_of<I, S>(text: &str, haystacks: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let needle = text.trim();
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    haystacks
        .into_iter()
        .any(|value| value.as_ref().to_lowercase().contains(&needle))
}
