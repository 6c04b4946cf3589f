/// Separators that may appear inside a wikilink reference.
pub struct Reference;

impl Reference {
    /// Starts the display alias: `[[name|alias]]`.
    pub const ALIAS: char = '|';
    /// Starts an in-document anchor: `[[name#heading]]`.
    pub const ANCHOR: char = '#';
    /// Separates path components: `[[folder/name]]`.
    pub const PATH: char = '/';

    /// Reduces a raw reference to the bare name used for lookups.
    ///
    /// Everything from the first alias or anchor separator on is dropped,
    /// then only the final path segment is kept.
    pub fn normalize(raw: &str) -> &str {
        let bare = raw
            .split([Self::ALIAS, Self::ANCHOR])
            .next()
            .unwrap_or(raw);
        bare.rsplit(Self::PATH).next().unwrap_or(bare).trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("apple", "apple")]
    #[case("apple|Red apple", "apple")]
    #[case("apple#Raw", "apple")]
    #[case("foods/fruit/apple#Raw|Apple", "apple")]
    #[case("foods/apple", "apple")]
    #[case(" apple ", "apple")]
    #[case("name|alias/with/slash", "name")]
    fn normalizes_references(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Reference::normalize(raw), expected);
    }
}
