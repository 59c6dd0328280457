use std::sync::LazyLock;

use regex::Regex;

static HIDDEN_REGIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<head\b[^>]*>.*?</head\s*>",
    )
    .expect("hidden region pattern is valid")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static CYRILLIC_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Cyrillic}+").expect("cyrillic pattern is valid")
});

static LATIN_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Latin}+").expect("latin pattern is valid")
});

/// The writing system whose letters make up index terms.
///
/// Every other character (digits, punctuation, letters of other scripts)
/// separates terms.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    #[default]
    Cyrillic,
    Latin,
}

impl Alphabet {
    fn words(self) -> &'static Regex {
        match self {
            Self::Cyrillic => &CYRILLIC_WORDS,
            Self::Latin => &LATIN_WORDS,
        }
    }
}

/// Turns text into lowercase single-script terms.
///
/// One tokenizer must be shared by indexing and query parsing, otherwise
/// query words will not line up with indexed terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tokenizer {
    alphabet: Alphabet,
}

impl Tokenizer {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Extract every maximal run of alphabet letters, lowercased, in
    /// document order. Duplicates are kept.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.alphabet
            .words()
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Tokenize page source, ignoring anything that is not visible text.
    pub fn tokenize_html(&self, html: &str) -> Vec<String> {
        self.tokenize(&strip_markup(html))
    }
}

/// Remove `<script>`, `<style>` and `<head>` regions, then every remaining
/// tag. Each removed span becomes a single space so neighbouring words do
/// not merge.
pub fn strip_markup(html: &str) -> String {
    let without_regions = HIDDEN_REGIONS.replace_all(html, " ");
    TAGS.replace_all(&without_regions, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_cyrillic_words() {
        let tokens = Tokenizer::default().tokenize("Кот СОБАКА мышь");
        assert_eq!(tokens, vec!["кот", "собака", "мышь"]);
    }

    #[test]
    fn digits_punctuation_and_other_scripts_separate() {
        let tokens =
            Tokenizer::default().tokenize("кот,собака42мышь cat ёж-ЁЛКА");
        assert_eq!(tokens, vec!["кот", "собака", "мышь", "ёж", "ёлка"]);
    }

    #[test]
    fn latin_alphabet_ignores_cyrillic() {
        let tokens =
            Tokenizer::new(Alphabet::Latin).tokenize("Hello кот World_2");
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn empty_and_separator_only_input() {
        let tokenizer = Tokenizer::default();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("123 !!! abc").is_empty());
    }

    #[test]
    fn strip_markup_drops_hidden_regions() {
        let html = "<html><HEAD><title>Заголовок</title></HEAD>\
                    <body><script type=\"x\">var кот = 1;</script>\
                    <STYLE>\nслон {}\n</STYLE><p>Видимый текст</p></body></html>";
        let tokens = Tokenizer::default().tokenize_html(html);
        assert_eq!(tokens, vec!["видимый", "текст"]);
    }

    #[test]
    fn strip_markup_keeps_words_apart() {
        let text = strip_markup("<b>кот</b><i>пёс</i>");
        assert_eq!(Tokenizer::default().tokenize(&text), vec!["кот", "пёс"]);
    }

    #[test]
    fn header_element_is_not_a_head_region() {
        let tokens = Tokenizer::default()
            .tokenize_html("<header>шапка</header><p>тело</p>");
        assert_eq!(tokens, vec!["шапка", "тело"]);
    }
}
