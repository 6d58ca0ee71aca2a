use super::*;

fn texts(document: &Document) -> Vec<(BlockType, String)> {
    document
        .iter()
        .map(|(_, line)| (line.block_type, line.text.clone()))
        .collect()
}

#[test]
fn build_classifies_each_line() {
    let document = Document::build(["# Title", "plain", "* item", "=> url label"]);
    assert_eq!(
        texts(&document),
        vec![
            (BlockType::H1, "Title".to_string()),
            (BlockType::Paragraph, "plain".to_string()),
            (BlockType::ListItem, "item".to_string()),
            (BlockType::Link, "url label".to_string()),
        ]
    );
    assert!(document.check_links());
}

#[test]
fn build_empty_input_yields_empty_document() {
    let document = Document::build(Vec::<String>::new());
    assert!(document.is_empty());
    assert_eq!(document.first(), None);
    assert_eq!(document.last(), None);
}

#[test]
fn preformatted_block_collapses_into_one_line() {
    let document = Document::build(["```", "a", "b", "```"]);
    assert_eq!(document.line_count(), 1);
    let (_, line) = document.iter().next().unwrap();
    assert_eq!(line.block_type, BlockType::Preformatted);
    assert_eq!(line.text, "a\nb");
}

#[test]
fn preformatted_round_trips_through_serialization() {
    let source = vec!["```", "a", "b", "```"];
    let document = Document::build(source.clone());
    assert_eq!(document.to_source_lines(), source);
}

#[test]
fn prefixed_lines_inside_preformatted_stay_raw() {
    let document = Document::build(["```", "# not a heading", "```"]);
    let (_, line) = document.iter().next().unwrap();
    assert_eq!(line.block_type, BlockType::Preformatted);
    assert_eq!(line.text, "# not a heading");
}

#[test]
fn unterminated_preformatted_block_drops_its_content() {
    let document = Document::build(["before", "```", "a", "b"]);
    assert_eq!(
        texts(&document),
        vec![(BlockType::Paragraph, "before".to_string())]
    );
    assert!(document.check_links());
}

#[test]
fn serialization_reemits_tokens_with_separator() {
    let source = vec!["# Title", "plain", "> quote", "* item", "=> url label", ""];
    let document = Document::build(source.clone());
    assert_eq!(document.to_source_lines(), source);
}

#[test]
fn display_emits_one_source_line_per_row() {
    let document = Document::build(["# Title", "body"]);
    assert_eq!(document.to_string(), "# Title\nbody\n");
}

#[test]
fn split_preserves_total_text() {
    let mut document = Document::build(["# Heading text"]);
    let id = document.first().unwrap();
    let requests = document.split_at(id, 7).unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].offset, 0);

    let lines = texts(&document);
    assert_eq!(lines[0], (BlockType::H1, "Heading".to_string()));
    assert_eq!(lines[1], (BlockType::Paragraph, " text".to_string()));
    assert!(document.check_links());
}

#[test]
fn split_at_boundaries() {
    let mut document = Document::build(["abc"]);
    let id = document.first().unwrap();
    document.split_at(id, 0).unwrap();
    assert_eq!(
        texts(&document),
        vec![
            (BlockType::Paragraph, "".to_string()),
            (BlockType::Paragraph, "abc".to_string()),
        ]
    );

    let mut document = Document::build(["abc"]);
    let id = document.first().unwrap();
    document.split_at(id, 3).unwrap();
    assert_eq!(
        texts(&document),
        vec![
            (BlockType::Paragraph, "abc".to_string()),
            (BlockType::Paragraph, "".to_string()),
        ]
    );
}

#[test]
fn split_rejects_out_of_range_offset() {
    let mut document = Document::build(["abc"]);
    let id = document.first().unwrap();
    assert_eq!(
        document.split_at(id, 4),
        Err(EditError::InvalidOffset { offset: 4, len: 3 })
    );
}

#[test]
fn split_rejects_a_preformatted_line() {
    // Splitting would strand the newline-bearing tail in a paragraph.
    let mut document = Document::build(["```", "a", "b", "```"]);
    let id = document.first().unwrap();
    assert_eq!(
        document.split_at(id, 1),
        Err(EditError::InvalidBlockType {
            expected: BlockType::Paragraph,
            found: BlockType::Preformatted,
        })
    );
    assert_eq!(document.get(id).unwrap().text, "a\nb");
    assert!(document.check_links());
}

#[test]
fn split_offsets_are_character_offsets() {
    let mut document = Document::build(["héllo"]);
    let id = document.first().unwrap();
    document.split_at(id, 2).unwrap();
    assert_eq!(
        texts(&document),
        vec![
            (BlockType::Paragraph, "hé".to_string()),
            (BlockType::Paragraph, "llo".to_string()),
        ]
    );
}

#[test]
fn merge_restores_split_line() {
    let mut document = Document::build(["> some quote"]);
    let id = document.first().unwrap();
    let requests = document.split_at(id, 4).unwrap();
    let new_id = requests[1].line;

    let requests = document.merge_with_previous(new_id).unwrap();
    assert_eq!(requests, vec![FocusRequest { line: id, offset: 4 }]);
    assert_eq!(
        texts(&document),
        vec![(BlockType::Quote, "some quote".to_string())]
    );
    assert!(document.check_links());
}

#[test]
fn merge_does_not_reclassify_the_predecessor() {
    // The concatenated text "# Title" would freshly classify as H1, but
    // merge never re-runs classification: the merge target's type wins.
    let mut document = Document::new();
    let first = document.push_back(Line::new(BlockType::Paragraph, "#"));
    let second = document.push_back(Line::new(BlockType::Paragraph, " Title"));

    document.merge_with_previous(second).unwrap();
    let line = document.get(first).unwrap();
    assert_eq!(line.block_type, BlockType::Paragraph);
    assert_eq!(line.text, "# Title");
}

#[test]
fn merge_on_first_line_is_a_noop() {
    let mut document = Document::build(["only"]);
    let id = document.first().unwrap();
    assert_eq!(document.merge_with_previous(id).unwrap(), Vec::new());
    assert_eq!(document.line_count(), 1);
}

#[test]
fn merged_line_handle_becomes_stale() {
    let mut document = Document::build(["a", "b"]);
    let second = document.next(document.first().unwrap()).unwrap();
    document.merge_with_previous(second).unwrap();
    assert_eq!(document.split_at(second, 0), Err(EditError::UnknownLine));
    assert!(document.get(second).is_none());
}

#[test]
fn remove_empty_line_focuses_end_of_predecessor() {
    let mut document = Document::build(["hello", ""]);
    let first = document.first().unwrap();
    let second = document.next(first).unwrap();

    let requests = document.remove_empty_line(second).unwrap();
    assert_eq!(
        requests,
        vec![FocusRequest {
            line: first,
            offset: 5,
        }]
    );
    assert_eq!(document.line_count(), 1);
    assert!(document.check_links());
}

#[test]
fn remove_empty_line_rejects_a_line_with_text() {
    let mut document = Document::build(["hello", "kept"]);
    let second = document.next(document.first().unwrap()).unwrap();

    assert_eq!(
        document.remove_empty_line(second),
        Err(EditError::LineNotEmpty { len: 4 })
    );
    assert_eq!(document.line_count(), 2);
    assert_eq!(document.get(second).unwrap().text, "kept");
}

#[test]
fn remove_empty_line_on_first_line_is_a_noop() {
    let mut document = Document::build(["", "rest"]);
    let first = document.first().unwrap();
    assert_eq!(document.remove_empty_line(first).unwrap(), Vec::new());
    assert_eq!(document.line_count(), 2);
}

#[test]
fn insert_raw_newline_grows_preformatted_in_place() {
    let mut document = Document::build(["```", "ab", "```"]);
    let id = document.first().unwrap();
    let requests = document.insert_raw_newline_at(id, 1).unwrap();
    assert_eq!(requests, vec![FocusRequest { line: id, offset: 2 }]);
    assert_eq!(document.get(id).unwrap().text, "a\nb");
    assert_eq!(document.line_count(), 1);
}

#[test]
fn insert_raw_newline_rejects_other_block_types() {
    let mut document = Document::build(["plain"]);
    let id = document.first().unwrap();
    assert_eq!(
        document.insert_raw_newline_at(id, 0),
        Err(EditError::InvalidBlockType {
            expected: BlockType::Preformatted,
            found: BlockType::Paragraph,
        })
    );
}

#[test]
fn insert_raw_newline_rejects_out_of_range_offset() {
    let mut document = Document::build(["```", "ab", "```"]);
    let id = document.first().unwrap();
    assert_eq!(
        document.insert_raw_newline_at(id, 3),
        Err(EditError::InvalidOffset { offset: 3, len: 2 })
    );
}

#[test]
fn demote_keeps_text() {
    let mut document = Document::build(["## Sub"]);
    let id = document.first().unwrap();
    let requests = document.demote(id).unwrap();
    assert_eq!(requests, vec![FocusRequest { line: id, offset: 0 }]);
    let line = document.get(id).unwrap();
    assert_eq!(line.block_type, BlockType::Paragraph);
    assert_eq!(line.text, "Sub");
}

#[test]
fn links_stay_mutual_inverses_across_edit_sequences() {
    let mut document = Document::build(["# one", "two", "three", "* four"]);
    assert!(document.check_links());

    let first = document.first().unwrap();
    document.split_at(first, 2).unwrap();
    assert!(document.check_links());

    let second = document.next(first).unwrap();
    document.merge_with_previous(second).unwrap();
    assert!(document.check_links());

    let last = document.last().unwrap();
    document.split_at(last, 4).unwrap();
    assert!(document.check_links());

    let tail = document.last().unwrap();
    document.remove_empty_line(tail).unwrap();
    assert!(document.check_links());

    // Forward and backward traversals must mirror each other.
    let forward: Vec<LineId> = document.iter().map(|(id, _)| id).collect();
    let mut backward = Vec::new();
    let mut cursor = document.last();
    while let Some(id) = cursor {
        backward.push(id);
        cursor = document.prev(id);
    }
    backward.reverse();
    assert_eq!(forward, backward);
}
