use super::*;

#[test]
fn test_suit_symbol_roundtrip() {
    for suit in Suit::ALL {
        assert_eq!(Suit::from_symbol(suit.symbol()), Some(suit));
    }
    assert_eq!(Suit::from_symbol('x'), None);
}

#[test]
fn test_pairings_are_involutions() {
    for pairing in [SuitPairing::Color, SuitPairing::Alternate] {
        for suit in Suit::ALL {
            let mapped = pairing.map(suit);
            assert_ne!(mapped, suit, "{pairing} maps {suit} to itself");
            assert_eq!(pairing.map(mapped), suit, "{pairing} is not an involution");
        }
    }
}

#[test]
fn test_color_pairing_swaps_same_colour() {
    let pairing = SuitPairing::Color;
    assert_eq!(pairing.map(Suit::Spades), Suit::Clubs);
    assert_eq!(pairing.map(Suit::Hearts), Suit::Diamonds);
}

#[test]
fn test_alternate_pairing_swaps_across_colours() {
    let pairing = SuitPairing::Alternate;
    assert_eq!(pairing.map(Suit::Spades), Suit::Hearts);
    assert_eq!(pairing.map(Suit::Clubs), Suit::Diamonds);
}

#[test]
fn test_pairing_parse() {
    assert_eq!("color".parse::<SuitPairing>(), Ok(SuitPairing::Color));
    assert_eq!(" Alternate ".parse::<SuitPairing>(), Ok(SuitPairing::Alternate));
    assert!("rainbow".parse::<SuitPairing>().is_err());
}

#[test]
fn test_suit_set_single_missing() {
    let set: SuitSet = [Suit::Spades, Suit::Hearts, Suit::Diamonds].into_iter().collect();
    assert_eq!(set.len(), 3);
    assert_eq!(set.single_missing(), Some(Suit::Clubs));

    let full: SuitSet = Suit::ALL.into_iter().collect();
    assert_eq!(full.single_missing(), None);

    let two: SuitSet = [Suit::Spades, Suit::Spades, Suit::Clubs].into_iter().collect();
    assert_eq!(two.len(), 2);
    assert_eq!(two.single_missing(), None);
    assert!(SuitSet::empty().is_empty());
}

#[test]
fn test_suit_set_union() {
    let a: SuitSet = [Suit::Spades].into_iter().collect();
    let b: SuitSet = [Suit::Hearts, Suit::Diamonds].into_iter().collect();
    let both = a.union(&b);
    assert_eq!(both.iter().collect::<Vec<_>>(), vec![Suit::Spades, Suit::Hearts, Suit::Diamonds]);
}

#[test]
fn test_status_terminality() {
    assert!(!PredictionStatus::Pending.is_terminal());
    assert!(PredictionStatus::HitImmediate.is_terminal());
    assert!(PredictionStatus::HitDelayed.is_terminal());
    assert!(PredictionStatus::Miss.is_terminal());
    assert_eq!(PredictionStatus::HitDelayed.glyph(), "✅1️⃣");
}

#[test]
fn test_handle_zero_is_unset() {
    assert!(!AnnouncementHandle::NONE.is_set());
    assert!(AnnouncementHandle(42).is_set());
}

#[test]
fn test_prediction_serializes() {
    let queued = QueuedPrediction {
        target_game: 106,
        predicted_suit: Suit::Spades,
        base_game: 100,
        queued_at_ms: 0,
    };
    let json = serde_json::to_string(&queued).expect("serialize");
    assert!(json.contains("\"target_game\":106"));
}
