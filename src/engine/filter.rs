/// Every character a learner can type into a French answer. Spaces are not
/// typed; the masked display re-inserts them from the target.
pub const FRENCH_CHARS: &[char] = &[
    '\'', 'a', 'à', 'â', 'b', 'c', 'ç', 'd', 'e', 'é', 'è', 'ê', 'ë', 'f', 'g', 'h', 'i', 'î',
    'ï', 'j', 'k', 'l', 'm', 'n', 'o', 'ô', 'œ', 'p', 'q', 'r', 's', 't', 'u', 'ù', 'û', 'ü',
    'v', 'w', 'x', 'y', 'ÿ', 'z', '-',
];

pub struct CharFilter {
    pub allowed: Vec<char>,
}

impl CharFilter {
    pub fn new(allowed: Vec<char>) -> Self {
        Self { allowed }
    }

    pub fn french() -> Self {
        Self::new(FRENCH_CHARS.to_vec())
    }

    pub fn is_allowed(&self, ch: char) -> bool {
        self.allowed.contains(&ch)
    }

    pub fn filter_text(&self, text: &str) -> String {
        text.chars().filter(|&ch| self.is_allowed(ch)).collect()
    }
}

impl Default for CharFilter {
    fn default() -> Self {
        Self::french()
    }
}
