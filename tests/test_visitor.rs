use sqltree::ast::{Node, NodeKind};
use sqltree::test_utils::{PARSING_TESTS_FILE, TestParsingData};
use sqltree::{map, parse, to_sql, visit};

fn parsing_tests() -> TestParsingData {
    let parsing_test_file =
        std::fs::read_to_string(PARSING_TESTS_FILE).expect("Cannot open parsing test cases");
    toml::from_str(&parsing_test_file).expect("Cannot parse test cases defined in toml")
}

#[test]
fn test_traversals_agree_on_fixtures() {
    for test in parsing_tests().tests {
        println!("Testing traversal for SQL: {}", test.sql);
        let tree = Node::from(parse(&test.sql).expect("sql should parse"));

        let mut visited = vec![];
        visit(&tree, |node| visited.push(node.kind()));
        let mut mapped = vec![];
        let identity = map(&tree, |node| {
            mapped.push(node.kind());
            None
        });

        assert_eq!(visited, mapped);
        assert_eq!(visited.first(), Some(&NodeKind::Select));
        assert_eq!(identity, tree);
    }
}

#[test]
fn test_map_qualifies_columns() {
    let tree = Node::from(parse("select a, t.b from t where a > 1").expect("sql should parse"));
    let qualified = map(&tree, |node| match node {
        Node::Column(name) => Some(Node::qualified_column("t", name)),
        // already qualified, keep as-is
        Node::QualifiedColumn(_) => Some(node.clone()),
        _ => None,
    });
    assert_eq!(
        to_sql(&qualified),
        "SELECT `t`.`a`, `t`.`b` FROM `t` WHERE `t`.`a` > 1"
    );
}

#[test]
fn test_collect_referenced_tables() {
    let tree = Node::from(
        parse(
            "select * from a join (select x from b) s on true \
             where exists (select 1 from c where c.x in (select x from d))",
        )
        .expect("sql should parse"),
    );
    let mut tables = vec![];
    visit(&tree, |node| {
        if let Node::Table(name) = node {
            tables.push(name.clone());
        }
    });
    assert_eq!(tables, vec!["a", "b", "c", "c", "d"]);
}
