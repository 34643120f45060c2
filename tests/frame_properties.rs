//! Property tests for the bracket frame parser.

use bracket_broker::{OutboundFrame, encode_frame, parse_frame};
use proptest::prelude::*;

/// Non-empty field text without brackets.
fn field() -> impl Strategy<Value = String> {
    "[^\\[\\]]{1,32}"
}

proptest! {
    #[test]
    fn parsing_never_panics_and_slots_are_clean(raw in any::<String>()) {
        let frame = parse_frame(raw.as_str());

        for slot in [frame.topic, frame.payload].into_iter().flatten() {
            prop_assert!(!slot.is_empty());
            prop_assert!(!slot.contains(']'));
        }
    }

    #[test]
    fn encoded_frames_parse_back(topic in field(), payload in field()) {
        let encoded = encode_frame(&topic, &payload);
        let frame = parse_frame(encoded.as_str());

        prop_assert_eq!(frame.topic, Some(topic.as_str()));
        prop_assert_eq!(frame.payload, Some(payload.as_str()));
    }

    #[test]
    fn outbound_frames_match_encode(topic in field(), payload in field()) {
        let outbound = OutboundFrame::new(topic.as_str(), payload.as_str()).unwrap();
        prop_assert_eq!(outbound.encode(), encode_frame(&topic, &payload));
    }

    #[test]
    fn trailing_content_is_ignored(
        topic in field(),
        payload in field(),
        trailing in any::<String>(),
    ) {
        let raw = format!("{}{trailing}", encode_frame(&topic, &payload));
        let frame = parse_frame(raw.as_str());

        prop_assert_eq!(frame.topic, Some(topic.as_str()));
        prop_assert_eq!(frame.payload, Some(payload.as_str()));
    }

    #[test]
    fn leading_text_hides_both_slots(lead in "[^\\[]", rest in any::<String>()) {
        let raw = format!("{lead}{rest}");
        let frame = parse_frame(raw.as_str());

        prop_assert_eq!(frame.topic, None);
        prop_assert_eq!(frame.payload, None);
    }
}
