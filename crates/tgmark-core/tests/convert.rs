use tgmark_core::{
    Entity, EntityKind, EntityType, RenderConfig, TextChunk, convert, convert_with_segments,
    split_entities, trim_newlines, utf16_len,
};

const DOCUMENT: &str = r#"# Release notes 🚀

Some **bold**, *italic*, ~~struck~~ and `code` with a [link](https://example.com).
Hidden ||spoiler|| text and an inline formula \(\alpha + \beta\).

## Details

> A quoted line with **emphasis**
> spanning two lines.

- first item
- second item with 😀 emoji
  - nested *item*
- [x] finished task
- [ ] open task

1. one
2. two

| Name | Value |
|------|-------|
| α    | 1     |
| beta | 22    |

```rust
fn main() {
    println!("hi");
}
```

---

Final paragraph with an image ![logo](https://example.com/logo.png) and <https://auto.link>.
"#;

fn assert_valid(text: &str, entities: &[Entity]) {
    let len = utf16_len(text);
    for entity in entities {
        assert!(entity.length > 0, "empty entity {entity:?}");
        assert!(
            entity.end() <= len,
            "entity {entity:?} past end of {len}-unit text"
        );
        assert!(
            entity.slice(text).is_some(),
            "entity {entity:?} splits a surrogate pair"
        );
    }
}

#[test]
fn test_flag_counts_four_units() {
    assert_eq!(utf16_len("🇺🇸"), 4);
    assert_eq!(utf16_len("a"), 1);
    assert_eq!(utf16_len("😀"), 2);
}

#[test]
fn test_nested_bold_contains_italic() {
    let (text, entities) = convert("**bold *italic* bold**", &RenderConfig::default());
    let bold = entities
        .iter()
        .find(|e| e.entity_type() == EntityType::Bold)
        .unwrap();
    let italic = entities
        .iter()
        .find(|e| e.entity_type() == EntityType::Italic)
        .unwrap();

    assert_eq!(bold.slice(&text), Some("bold italic bold"));
    assert!(italic.offset > bold.offset && italic.end() < bold.end());
    assert_eq!(italic.slice(&text), Some("italic"));
}

#[test]
fn test_heading_mapping() {
    let config = RenderConfig::default();

    let (text, entities) = convert("# Title", &config);
    assert!(text.starts_with("📌 "));
    let types: Vec<_> = entities.iter().map(Entity::entity_type).collect();
    assert!(types.contains(&EntityType::Bold));
    assert!(types.contains(&EntityType::Underline));
    for entity in &entities {
        assert_eq!(entity.slice(&text), Some("Title"));
    }

    let (_, entities) = convert("### Title", &config);
    assert!(entities.iter().any(|e| e.entity_type() == EntityType::Bold));
    assert!(
        !entities
            .iter()
            .any(|e| e.entity_type() == EntityType::Underline)
    );
}

#[test]
fn test_split_on_newlines() {
    let chunks = split_entities("aaa\nbbb\nccc", &[], 5);
    assert_eq!(
        chunks.iter().map(|c| c.text.as_str()).collect::<String>(),
        "aaa\nbbb\nccc"
    );
    assert!(chunks.iter().all(|c| utf16_len(&c.text) <= 5));
    assert_eq!(chunks.len(), 3);
}

#[test]
fn test_document_entities_are_valid() {
    let conversion = convert_with_segments(DOCUMENT, &RenderConfig::default());
    assert_valid(&conversion.text, &conversion.entities);
    assert!(!conversion.text.contains("**"));
    assert!(!conversion.text.contains("||"));
    assert!(!conversion.text.contains("\\("));
}

#[test]
fn test_document_features() {
    let conversion = convert_with_segments(DOCUMENT, &RenderConfig::default());
    let text = &conversion.text;
    let of_type = |entity_type: EntityType| -> Vec<&Entity> {
        conversion
            .entities
            .iter()
            .filter(|e| e.entity_type() == entity_type)
            .collect()
    };

    let spoiler = of_type(EntityType::Spoiler);
    assert_eq!(spoiler.len(), 1);
    assert_eq!(spoiler[0].slice(text), Some("spoiler"));

    assert!(text.contains("$α + β$"));
    assert!(text.contains("✅ finished task"));
    assert!(text.contains("☑️ open task"));
    assert!(text.contains("  ⦁ nested item"));
    assert!(text.contains("————————"));

    let links: Vec<_> = of_type(EntityType::TextLink)
        .into_iter()
        .filter_map(Entity::url)
        .collect();
    assert_eq!(
        links,
        vec![
            "https://example.com",
            "https://example.com/logo.png",
            "https://auto.link"
        ]
    );

    let pres = of_type(EntityType::Pre);
    assert_eq!(pres.len(), 2);
    assert!(pres.iter().any(|e| e.language() == Some("rust")));

    assert_eq!(conversion.segments.len(), 1);
    assert_eq!(
        conversion.segments[0].raw_source,
        "fn main() {\n    println!(\"hi\");\n}"
    );
    assert_eq!(
        &text[conversion.segments[0].byte_range.clone()],
        conversion.segments[0].raw_source
    );
}

#[test]
fn test_split_round_trip_preserves_text_and_entities() {
    let (text, entities) = convert(DOCUMENT, &RenderConfig::default());
    for max_len in [1, 2, 3, 7, 16, 40, 100, 4096] {
        let chunks = split_entities(&text, &entities, max_len);
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, text, "max_len = {max_len}");

        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert_valid(&chunk.text, &chunk.entities);
            let units = utf16_len(&chunk.text) as usize;
            // Only a lone character wider than the budget may exceed it.
            assert!(units <= max_len || chunk.text.chars().count() == 1);
        }
    }
}

#[test]
fn test_trim_is_idempotent_on_chunks() {
    let (text, entities) = convert(DOCUMENT, &RenderConfig::default());
    for chunk in split_entities(&text, &entities, 64) {
        let once = trim_newlines(&chunk.text, &chunk.entities);
        let twice = trim_newlines(&once.text, &once.entities);
        assert_eq!(once, twice);
        assert_valid(&once.text, &once.entities);
    }
}

#[test]
fn test_latex_escape_can_be_disabled() {
    let config = RenderConfig {
        latex_escape: false,
        ..RenderConfig::default()
    };
    let (text, _) = convert(r"\(\alpha + \beta\)", &config);
    assert_eq!(text, r"(\alpha + \beta)");
}

#[test]
fn test_spoiler_inside_code_is_literal() {
    let (text, entities) = convert("`a || b` ||c||", &RenderConfig::default());
    assert_eq!(text, "a || b c");
    assert_eq!(
        entities,
        vec![
            Entity::new(EntityKind::Code, 0, 6),
            Entity::new(EntityKind::Spoiler, 7, 1),
        ]
    );
}

#[test]
fn test_deeply_chained_math_commands_convert() {
    let roots = format!("\\({}x\\)", r"\sqrt".repeat(10_000));
    let (text, entities) = convert(&roots, &RenderConfig::default());
    assert!(text.starts_with("$√"));
    assert!(text.contains('x'));
    assert_valid(&text, &entities);

    let optional = format!("\\({}x\\)", r"\sqrt[".repeat(5_000));
    let (text, entities) = convert(&optional, &RenderConfig::default());
    assert!(text.contains('x'));
    assert_valid(&text, &entities);
}

#[test]
fn test_degenerate_inputs_do_not_panic() {
    for input in ["", " ", "\n\n\n", "\t\n  \n", "#", "> ", "* * *", "||", "```"] {
        let (text, entities) = convert(input, &RenderConfig::default());
        assert_valid(&text, &entities);
        let trimmed = trim_newlines(&text, &entities);
        assert_valid(&trimmed.text, &trimmed.entities);
        for chunk in split_entities(&trimmed.text, &trimmed.entities, 4096) {
            assert_valid(&chunk.text, &chunk.entities);
        }
    }
    assert_eq!(trim_newlines("\n\n", &[]), TextChunk::default());
}
