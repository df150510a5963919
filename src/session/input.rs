use crate::engine::filter::CharFilter;
use crate::session::practice::PracticeSession;

/// Appends `ch` to the answer when it is an accepted character and the answer
/// is still shorter than the target without spaces. Returns whether the
/// character was taken.
pub fn process_char(session: &mut PracticeSession, filter: &CharFilter, ch: char) -> bool {
    if session.is_revealed() || !filter.is_allowed(ch) {
        return false;
    }
    let Some(limit) = session.target().map(|t| t.answer_chars()) else {
        return false;
    };
    if session.typed_so_far.chars().count() >= limit {
        return false;
    }
    session.typed_so_far.push(ch);
    true
}

pub fn process_backspace(session: &mut PracticeSession) {
    if !session.is_revealed() {
        session.typed_so_far.pop();
    }
}

pub fn process_delete(session: &mut PracticeSession) {
    if !session.is_revealed() {
        session.typed_so_far.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::practice::PracticeConfig;
    use crate::vocab::VocabularyItem;

    fn session(word: &str) -> PracticeSession {
        let config = PracticeConfig {
            audio_enabled: false,
            ..PracticeConfig::default()
        };
        PracticeSession::with_seed(vec![VocabularyItem::new("1", word, "x")], config, 0).unwrap()
    }

    fn type_str(session: &mut PracticeSession, text: &str) {
        let filter = CharFilter::french();
        for ch in text.chars() {
            process_char(session, &filter, ch);
        }
    }

    #[test]
    fn typing_stops_at_target_length_without_spaces() {
        let mut s = session("un chat");
        type_str(&mut s, "unchatxyz");
        assert_eq!(s.typed(), "unchat");
    }

    #[test]
    fn disallowed_characters_are_dropped() {
        let mut s = session("l'été");
        type_str(&mut s, "L 1l'été");
        assert_eq!(s.typed(), "l'été");
    }

    #[test]
    fn backspace_and_delete() {
        let mut s = session("chien");
        type_str(&mut s, "chi");
        process_backspace(&mut s);
        assert_eq!(s.typed(), "ch");
        process_delete(&mut s);
        assert_eq!(s.typed(), "");
        process_backspace(&mut s);
        assert_eq!(s.typed(), "");
    }

    #[test]
    fn revealed_answer_cannot_be_edited() {
        let mut s = session("chat");
        type_str(&mut s, "ch");
        s.submit_typed();
        assert!(s.is_revealed());
        type_str(&mut s, "a");
        process_backspace(&mut s);
        process_delete(&mut s);
        assert_eq!(s.typed(), "chat");
    }

    #[test]
    fn multibyte_characters_count_once() {
        let mut s = session("été");
        type_str(&mut s, "ééééé");
        assert_eq!(s.typed(), "ééé");
    }
}
