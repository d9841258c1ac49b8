//! End-to-end walkthroughs of the hide / query / unhide cycle
//!
//! Each test drives one complete scenario through the public API, from the
//! raw text to the flattened result.

use hidetree::{HideError, Tree, ROOT};

const COMMENTS: &str = "foo foo foo <comment with foo> foo foo <more comments with foo>";
const RECORDS: &str =
    "Groot:foo foo foo ¤ foo foo ¤;comment:<comment with foo>;comment:<more comments with foo>;";

fn groot(text: &str) -> Tree {
    let mut tree = Tree::new(text);
    tree.set_node_name(ROOT, "Groot").unwrap();
    tree
}

fn records() -> Tree {
    Tree::from_records(RECORDS, ':', ';', '¤').unwrap()
}

#[test]
fn test_fresh_tree_holds_input() {
    let tree = Tree::new(COMMENTS);
    assert_eq!(tree.text(ROOT), Some(COMMENTS));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_replace_outside_and_inside_comments() {
    let mut tree = groot(COMMENTS);
    tree.define("<Comment>").unwrap();
    tree.hide_all("comment", "<.*?>", "<Comment>", "*").unwrap();
    tree.ignore_all("comment");

    insta::assert_snapshot!(tree.to_string(), @r###"
    0#Groot# "foo foo foo [#1] foo foo [#2]" root no groups
      1#comment# "<comment with foo>" => 0#(12 15) #i <- 1 2> no groups
      2#comment# "<more comments with foo>" => 0#(24 27) #i <1 2 -> no groups
    #### Total number of nodes defined = 3.
    "###);

    tree.replace_all("foo", "bar", "*");
    tree.unignore_all();
    tree.replace_all("foo", "tar", "comment");
    tree.unhide_all();

    assert_eq!(
        tree.text(ROOT),
        Some("bar bar bar <comment with tar> bar bar <more comments with tar>")
    );
}

#[test]
fn test_iterate_comments() {
    let mut tree = groot(COMMENTS);
    tree.define("<Comment>").unwrap();
    tree.hide_all("comment", "<.*?>", "<Comment>", "*").unwrap();

    let mut found = Vec::new();
    while let Some(id) = tree.get_node("comment") {
        found.push(tree.text(id).unwrap().to_string());
    }
    assert_eq!(found, vec!["<comment with foo>", "<more comments with foo>"]);

    // The cursor was reset by running off the end.
    assert_eq!(tree.get_node("comment"), Some(1));
    tree.get_node_reset("comment");

    tree.unhide_all();
    assert_eq!(tree.text(ROOT), Some(COMMENTS));
}

#[test]
fn test_swap_first_and_last_comment() {
    let mut tree = groot(COMMENTS);
    tree.define("<Comment>").unwrap();
    tree.hide_all("comment", "<.*?>", "<Comment>", "*").unwrap();

    let mut first = None;
    let mut last = None;
    while let Some(id) = tree.get_node("comment") {
        first.get_or_insert(id);
        last = Some(id);
    }
    let (first, last) = (first.unwrap(), last.unwrap());

    let buffer = tree.detached("");
    tree.replace(buffer, first).unwrap();
    tree.replace(first, last).unwrap();
    tree.replace(last, buffer).unwrap();

    assert_eq!((first, last), (1, 2));
    assert_eq!(tree.text(1), Some("<more comments with foo>"));
    assert_eq!(tree.text(2), Some("<comment with foo>"));

    tree.unhide_all();
    assert_eq!(
        tree.text(ROOT),
        Some("foo foo foo <more comments with foo> foo foo <comment with foo>")
    );
}

#[test]
fn test_records_unhide() {
    let mut tree = records();
    assert_eq!(tree.node(ROOT).unwrap().name(), "Groot");
    assert_eq!(tree.named("comment"), vec![1, 2]);
    tree.unhide_all();
    assert_eq!(tree.text(ROOT), Some(COMMENTS));
}

#[test]
fn test_edit_unfolded_comment() {
    let mut tree = records();
    tree.define("<Fold>").unwrap();

    let first = tree.get_first_node("comment").unwrap();
    assert!(tree.unfold(first, "<Fold>", "<Fold>").unwrap());
    assert_eq!(tree.replace_all("foo", "bar", "Groot"), 6);
    assert_eq!(tree.fold_all(), 1);
    tree.unhide_all();

    assert_eq!(
        tree.text(ROOT),
        Some("bar bar bar <comment with bar> bar bar <more comments with foo>")
    );
}

#[test]
fn test_promote_groups() {
    let mut tree = records();
    tree.define("<Group>").unwrap();
    tree.hide_all("foo", "(f+)(o+)", "<Group>", "Groot").unwrap();
    assert_eq!(tree.named("foo").len(), 5);

    tree.hide_node_group("group1", "X", 1, "Groot", "foo").unwrap();
    tree.hide_node_group("group2", "Z", 2, "Groot", "foo").unwrap();

    assert_eq!(tree.named("group1").len(), 5);
    assert_eq!(tree.named("group2").len(), 5);
    let foo = tree.get_first_node("foo").unwrap();
    assert_eq!(tree.text(foo), Some("XZ"));
    assert_eq!(tree.node(foo).unwrap().group_text(2), Some("Z"));
    // Comments were never targeted.
    assert_eq!(tree.text(1), Some("<comment with foo>"));

    assert_eq!(
        tree.hide_node_group("group3", "Y", 3, "Groot", "foo"),
        Err(HideError::GroupIndexOutOfRange {
            node: foo,
            group: 3,
            available: 2,
        })
    );

    tree.unhide_all();
    assert_eq!(tree.text(ROOT), Some(COMMENTS));
}

#[test]
fn test_word_map() {
    let mut tree = records();
    tree.define("<Word>").unwrap();
    tree.hide_all("word", r"\w+", "<Word>", "comment").unwrap();

    let map = tree.make_map("comment", "word");
    assert_eq!(map.get("foo").map(Vec::len), Some(2));
    assert_eq!(tree.text(ROOT), Some("foo foo foo ¤ foo foo ¤"));

    tree.unhide_all();
    assert_eq!(tree.text(ROOT), Some(COMMENTS));
}

#[test]
fn test_hide_the_rest() {
    let mut tree = records();
    tree.define("<rest>").unwrap();
    tree.hide_the_rest("rest", "<rest>", "*").unwrap();

    // The comments hold no hidden children, so they keep their text.
    insta::assert_snapshot!(tree.to_string(), @r###"
    0#Groot# "[#3][#1][#4][#2]" root no groups
      3#rest# "foo foo foo " => 0#(0 3) <- 3 1> no groups
      1#comment# "<comment with foo>" => 0#(3 5) <3 1 4> no groups
      4#rest# " foo foo " => 0#(5 8) <1 4 2> no groups
      2#comment# "<more comments with foo>" => 0#(8 10) <4 2 -> no groups
    #### Total number of nodes defined = 5.
    "###);

    tree.unhide_all();
    assert_eq!(tree.text(ROOT), Some(COMMENTS));
}

#[test]
fn test_fortran_like_source() {
    let source = "text 'string' ! prog's comments\nMore text 'str'# 'string'";
    let mut tree = Tree::new(source);
    tree.define_macro("< >", "[ \\t]*").unwrap();
    tree.define_macro("<#>", "[^\\n]*").unwrap();
    tree.define("<String>").unwrap();

    tree.hide_all("string", r#"'[^'\n]*'|"[^"\n]*""#, "<String>", "*").unwrap();
    tree.hide_all("comment", r"(?m)^[cC]<#>\n", "\n", "*").unwrap();
    tree.hide_all("comment", r"(?m)^< >!.*\n", "\n", "*").unwrap();
    tree.hide_all("comment", r"(?m)!.*\n", "\n", "*").unwrap();

    let strings: Vec<&str> = tree
        .named("string")
        .into_iter()
        .filter_map(|id| tree.text(id))
        .collect();
    assert_eq!(strings, vec!["'string'", "'str'", "'string'"]);
    assert_eq!(tree.named("comment").len(), 1);
    assert_eq!(
        tree.text(tree.get_first_node("comment").unwrap()),
        Some("! prog's comments\n")
    );

    tree.unhide_all();
    assert_eq!(tree.text(ROOT), Some(source));
}

#[test]
fn test_queries_after_unhide() {
    let mut tree = records();
    tree.define("<Word>").unwrap();
    tree.hide_all("word", r"\w+", "<Word>", "comment").unwrap();
    tree.unhide_all();
    assert_eq!(tree.text(ROOT), Some(COMMENTS));

    assert_eq!(tree.named("comment"), vec![1, 2]);
    assert_eq!(tree.get_first_node("word"), Some(3));
    let mut comments = Vec::new();
    while let Some(id) = tree.get_node("comment") {
        comments.push(tree.text(id).unwrap().to_string());
    }
    assert_eq!(comments, vec!["<comment with foo>", "<more comments with foo>"]);
    assert_eq!(tree.make_map("comment", "word")["foo"], vec![5, 9]);
    assert_eq!(tree.set_node_name_all("remark", "Groot", "comment"), 2);

    // Expanded nodes are no longer part of the document's visible text.
    assert_eq!(tree.replace_all("foo", "bar", "remark"), 0);
    assert!(tree.children(ROOT).is_empty());
    assert_eq!(tree.expanded_children(ROOT), &[1, 2]);
}

#[test]
fn test_backreferences_are_rejected() {
    let mut tree = Tree::new("text 'string' \"str\"");
    tree.define("<String>").unwrap();
    let before = tree.to_string();
    assert!(matches!(
        tree.hide_all("string", r#"(["'])[^"'\n]*\1"#, "<String>", "*"),
        Err(HideError::PatternCompile { .. })
    ));
    assert_eq!(tree.to_string(), before);

    // The alternation spelled out matches the same strings.
    tree.hide_all("string", r#"'[^'\n]*'|"[^"\n]*""#, "<String>", "*").unwrap();
    assert_eq!(tree.named("string").len(), 2);
}

#[test]
fn test_undefined_label_leaves_tree_untouched() {
    let mut tree = groot(COMMENTS);
    let before = tree.to_string();
    assert_eq!(
        tree.hide_all("comment", "<.*?>", "<Comment>", "*"),
        Err(HideError::UndefinedLabel("<Comment>".to_string()))
    );
    tree.define("<Comment>").unwrap();
    assert_eq!(
        tree.hide_all("comment", "<Body>", "<Comment>", "*"),
        Err(HideError::UndefinedLabel("<Body>".to_string()))
    );
    assert!(matches!(
        tree.hide_all("comment", "(unclosed", "<Comment>", "*"),
        Err(HideError::PatternCompile { .. })
    ));
    assert_eq!(tree.to_string(), before);
}
