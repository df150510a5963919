/// Placeholder shown for every answer character not typed yet.
pub const PLACEHOLDER: char = '_';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotKind {
    Space,
    Typed,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub ch: char,
    pub kind: SlotKind,
}

/// Projects the typed answer onto the shape of `target`: spaces stay where the
/// target has them, other positions take typed characters left to right and
/// show `_` once the typed text runs out.
pub fn masked_slots(target: &str, typed: &str) -> Vec<Slot> {
    let mut typed_chars = typed.chars();
    target
        .chars()
        .map(|ch| {
            if ch == ' ' {
                Slot {
                    ch: ' ',
                    kind: SlotKind::Space,
                }
            } else {
                match typed_chars.next() {
                    Some(t) => Slot {
                        ch: t,
                        kind: SlotKind::Typed,
                    },
                    None => Slot {
                        ch: PLACEHOLDER,
                        kind: SlotKind::Pending,
                    },
                }
            }
        })
        .collect()
}

pub fn masked_display(target: &str, typed: &str) -> String {
    masked_slots(target, typed).iter().map(|s| s.ch).collect()
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;

    #[test]
    fn fully_typed_phrase_keeps_spaces() {
        assert_eq!(masked_display("un chat", "unchat"), "un chat");
    }

    #[test]
    fn partial_input_fills_left_to_right() {
        assert_eq!(masked_display("un chat", "unc"), "un c___");
        assert_eq!(masked_display("un chat", ""), "__ ____");
    }

    #[test]
    fn typed_character_never_lands_on_a_space() {
        let slots = masked_slots("a b c", "abc");
        assert_eq!(slots[1].kind, SlotKind::Space);
        assert_eq!(slots[3].kind, SlotKind::Space);
        assert_eq!(masked_display("a b c", "abc"), "a b c");
    }

    #[test]
    fn every_slot_is_a_letter_space_or_placeholder() {
        let shape = Regex::new(r"^[a-zà-ÿœ'\- _]+$").unwrap();
        for typed in ["", "p", "pomme", "pommede"] {
            let shown = masked_display("pomme de terre", typed);
            assert_eq!(shown.chars().count(), "pomme de terre".chars().count());
            assert!(shape.is_match(&shown), "{shown}");
        }
    }

    #[test]
    fn accented_targets_count_chars_not_bytes() {
        assert_eq!(masked_display("thé vert", "th"), "th_ ____");
    }
}
