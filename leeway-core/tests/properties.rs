//! Property tests for the ingestion pipeline

use heapless::Vec;
use leeway_core::{
    Engine, EmptyFieldPolicy, EngineConfig, SentenceBuffer, SentenceParser, DEFAULT_CAPACITY,
};
use leeway_protocol::{checksum, validate, Sentence};
use proptest::prelude::*;

fn passthrough_parser() -> SentenceParser {
    let config = EngineConfig {
        legacy: Vec::new(),
        empty_fields: EmptyFieldPolicy::Keep,
        ..EngineConfig::default()
    };
    config.parser()
}

proptest! {
    #[test]
    fn fields_round_trip(
        tag in "[A-Z]{5}",
        fields in prop::collection::vec("[A-Za-z0-9.]{0,6}", 0..10),
    ) {
        let mut raw = std::string::String::from("$");
        raw.push_str(&tag);
        for field in &fields {
            raw.push(',');
            raw.push_str(field);
        }

        let sentence = passthrough_parser().parse(&raw).unwrap();
        prop_assert_eq!(sentence.field_count(), fields.len() + 1);
        prop_assert_eq!(&sentence.tag()[1..], tag.as_str());
        for (i, field) in fields.iter().enumerate() {
            prop_assert_eq!(sentence.field(i + 1), Some(field.as_str()));
        }
        prop_assert!(validate(sentence.body()).is_ok());
        prop_assert_eq!(sentence.body().matches('*').count(), 1);
    }

    #[test]
    fn empty_fields_become_zero(count in 1usize..15) {
        let mut raw = std::string::String::from("$IIXDR");
        for _ in 0..count {
            raw.push(',');
        }
        let sentence = SentenceParser::default().parse(&raw).unwrap();
        prop_assert_eq!(sentence.field_count(), count + 1);
        for i in 1..=count {
            prop_assert_eq!(sentence.field(i), Some("0"));
        }
        prop_assert!(sentence.body().starts_with(raw.as_str()));
    }

    #[test]
    fn checksum_is_deterministic(body in "[ -)+-~]{0,79}") {
        prop_assert_eq!(checksum(&body), checksum(&body));
    }

    #[test]
    fn checksum_detects_single_mutation(
        body in "[A-Z0-9,.]{1,70}",
        index in any::<prop::sample::Index>(),
        replacement in "[A-Z0-9,.]",
    ) {
        let position = index.index(body.len());
        let original = &body[position..position + 1];
        prop_assume!(original != replacement);

        let mut mutated = std::string::String::from(&body[..position]);
        mutated.push_str(&replacement);
        mutated.push_str(&body[position + 1..]);

        prop_assert_ne!(checksum(&body), checksum(&mutated));
    }

    #[test]
    fn buffer_is_lifo(count in 0usize..=DEFAULT_CAPACITY) {
        let mut buffer: SentenceBuffer = SentenceBuffer::new();
        for i in 0..count {
            let value = format!("{}", i);
            let sentence = Sentence::from_fields(&["$IIMTW", &value]).unwrap();
            prop_assert_eq!(buffer.push(sentence), Ok(i + 1));
        }
        for i in (0..count).rev() {
            let expected = format!("{}", i);
            let popped = buffer.pop().unwrap();
            prop_assert_eq!(popped.field(1), Some(expected.as_str()));
        }
        prop_assert!(buffer.pop().is_none());
    }

    #[test]
    fn arbitrary_bytes_never_overfill(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut engine: Engine = Engine::default();
        engine.feed_bytes(&bytes);
        prop_assert!(engine.pending() <= DEFAULT_CAPACITY);
        while let Some(sentence) = engine.pop() {
            prop_assert!(sentence.is_terminated());
            prop_assert!(sentence.has_checksum());
            prop_assert!(sentence.body().len() <= leeway_protocol::MAX_SENTENCE_LEN);
        }
    }
}

#[test]
fn sixth_push_is_rejected() {
    let mut buffer: SentenceBuffer = SentenceBuffer::new();
    for tag in ["$AAAAA", "$BBBBB", "$CCCCC", "$DDDDD", "$EEEEE"] {
        buffer.push(Sentence::from_fields(&[tag]).unwrap()).unwrap();
    }
    assert!(buffer.push(Sentence::from_fields(&["$FFFFF"]).unwrap()).is_err());

    let popped: std::vec::Vec<_> = std::iter::from_fn(|| buffer.pop())
        .map(|s| std::string::String::from(s.tag()))
        .collect();
    assert_eq!(popped, ["$EEEEE", "$DDDDD", "$CCCCC", "$BBBBB", "$AAAAA"]);
    assert!(buffer.pop().is_none());
}
