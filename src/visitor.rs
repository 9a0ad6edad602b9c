//! Pre-order traversal and structural rewriting of syntax trees.
//!
//! [`visit`] observes every node, [`map`] builds a new tree and lets the
//! caller substitute whole subtrees. Neither touches the input tree.

use crate::ast::{As, Between, Binary, Function, Join, Node, QualifiedColumn, QualifiedJoin, Select};

impl Node {
    /// Direct node-valued children, in field order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Select(select) => select.children(),
            Node::SelectList(nodes)
            | Node::Distinct(nodes)
            | Node::FromClause(nodes)
            | Node::GroupByClause(nodes)
            | Node::OrderClause(nodes)
            | Node::InValueList(nodes)
            | Node::Using(nodes) => nodes.iter().collect(),
            Node::Function(function) => function.arguments.iter().collect(),
            Node::Subquery(node)
            | Node::WhereClause(node)
            | Node::HavingClause(node)
            | Node::Ascending(node)
            | Node::Descending(node)
            | Node::Exists(node)
            | Node::Not(node)
            | Node::UnaryPlus(node)
            | Node::UnaryMinus(node)
            | Node::On(node)
            | Node::Sum(node)
            | Node::Minimum(node)
            | Node::Maximum(node)
            | Node::Average(node)
            | Node::Count(node) => vec![node],
            Node::Or(binary)
            | Node::And(binary)
            | Node::Equals(binary)
            | Node::NotEquals(binary)
            | Node::Greater(binary)
            | Node::Less(binary)
            | Node::GreaterOrEquals(binary)
            | Node::LessOrEquals(binary)
            | Node::Is(binary)
            | Node::IsNot(binary)
            | Node::Like(binary)
            | Node::NotLike(binary)
            | Node::In(binary)
            | Node::NotIn(binary)
            | Node::Multiply(binary)
            | Node::Divide(binary)
            | Node::Add(binary)
            | Node::Subtract(binary) => vec![&binary.left, &binary.right],
            Node::Between(between) | Node::NotBetween(between) => {
                vec![&between.left, &between.min, &between.max]
            }
            Node::CrossJoin(join) => vec![&join.left, &join.right],
            Node::InnerJoin(join)
            | Node::LeftJoin(join)
            | Node::LeftOuterJoin(join)
            | Node::RightJoin(join)
            | Node::RightOuterJoin(join)
            | Node::FullJoin(join)
            | Node::FullOuterJoin(join) => {
                vec![&join.left, &join.right, &join.search_condition]
            }
            Node::QualifiedColumn(qualified) => vec![&qualified.table, &qualified.column],
            Node::As(alias) => vec![&alias.value, &alias.column],
            Node::All
            | Node::LimitClause(_)
            | Node::Table(_)
            | Node::Column(_)
            | Node::True
            | Node::False
            | Node::Null
            | Node::String(_)
            | Node::Integer(_)
            | Node::Float(_)
            | Node::Date(_)
            | Node::DateTime(_) => vec![],
        }
    }

    /// Calls `f` on this node and then on every descendant, parents first.
    pub fn visit<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Rebuilds the tree bottom-up through `f`.
    ///
    /// When `f` returns a replacement for a node, the replacement is used
    /// as-is and its subtree is not descended into. Otherwise the node is
    /// rebuilt from its mapped children.
    pub fn map<F: FnMut(&Node) -> Option<Node>>(&self, f: &mut F) -> Node {
        if let Some(replacement) = f(self) {
            return replacement;
        }

        match self {
            Node::Select(select) => Node::Select(select.map_children(f)),
            Node::Subquery(node) => Node::Subquery(map_box(node, f)),

            Node::SelectList(nodes) => Node::SelectList(map_vec(nodes, f)),
            Node::Distinct(nodes) => Node::Distinct(map_vec(nodes, f)),
            Node::All => Node::All,

            Node::FromClause(nodes) => Node::FromClause(map_vec(nodes, f)),
            Node::WhereClause(node) => Node::WhereClause(map_box(node, f)),
            Node::GroupByClause(nodes) => Node::GroupByClause(map_vec(nodes, f)),
            Node::HavingClause(node) => Node::HavingClause(map_box(node, f)),
            Node::OrderClause(nodes) => Node::OrderClause(map_vec(nodes, f)),
            Node::LimitClause(limit) => Node::LimitClause(limit.clone()),

            Node::Ascending(node) => Node::Ascending(map_box(node, f)),
            Node::Descending(node) => Node::Descending(map_box(node, f)),

            Node::Or(binary) => Node::Or(map_binary(binary, f)),
            Node::And(binary) => Node::And(map_binary(binary, f)),

            Node::Equals(binary) => Node::Equals(map_binary(binary, f)),
            Node::NotEquals(binary) => Node::NotEquals(map_binary(binary, f)),
            Node::Greater(binary) => Node::Greater(map_binary(binary, f)),
            Node::Less(binary) => Node::Less(map_binary(binary, f)),
            Node::GreaterOrEquals(binary) => Node::GreaterOrEquals(map_binary(binary, f)),
            Node::LessOrEquals(binary) => Node::LessOrEquals(map_binary(binary, f)),
            Node::Is(binary) => Node::Is(map_binary(binary, f)),
            Node::IsNot(binary) => Node::IsNot(map_binary(binary, f)),
            Node::Like(binary) => Node::Like(map_binary(binary, f)),
            Node::NotLike(binary) => Node::NotLike(map_binary(binary, f)),
            Node::In(binary) => Node::In(map_binary(binary, f)),
            Node::NotIn(binary) => Node::NotIn(map_binary(binary, f)),

            Node::Between(between) => Node::Between(map_between(between, f)),
            Node::NotBetween(between) => Node::NotBetween(map_between(between, f)),
            Node::InValueList(nodes) => Node::InValueList(map_vec(nodes, f)),
            Node::Exists(node) => Node::Exists(map_box(node, f)),

            Node::Multiply(binary) => Node::Multiply(map_binary(binary, f)),
            Node::Divide(binary) => Node::Divide(map_binary(binary, f)),
            Node::Add(binary) => Node::Add(map_binary(binary, f)),
            Node::Subtract(binary) => Node::Subtract(map_binary(binary, f)),

            Node::Not(node) => Node::Not(map_box(node, f)),
            Node::UnaryPlus(node) => Node::UnaryPlus(map_box(node, f)),
            Node::UnaryMinus(node) => Node::UnaryMinus(map_box(node, f)),

            Node::CrossJoin(join) => Node::CrossJoin(Join {
                left: map_box(&join.left, f),
                right: map_box(&join.right, f),
            }),
            Node::InnerJoin(join) => Node::InnerJoin(map_qualified_join(join, f)),
            Node::LeftJoin(join) => Node::LeftJoin(map_qualified_join(join, f)),
            Node::LeftOuterJoin(join) => Node::LeftOuterJoin(map_qualified_join(join, f)),
            Node::RightJoin(join) => Node::RightJoin(map_qualified_join(join, f)),
            Node::RightOuterJoin(join) => Node::RightOuterJoin(map_qualified_join(join, f)),
            Node::FullJoin(join) => Node::FullJoin(map_qualified_join(join, f)),
            Node::FullOuterJoin(join) => Node::FullOuterJoin(map_qualified_join(join, f)),
            Node::On(node) => Node::On(map_box(node, f)),
            Node::Using(nodes) => Node::Using(map_vec(nodes, f)),

            Node::Table(name) => Node::Table(name.clone()),
            Node::Column(name) => Node::Column(name.clone()),
            Node::QualifiedColumn(qualified) => Node::QualifiedColumn(QualifiedColumn {
                table: map_box(&qualified.table, f),
                column: map_box(&qualified.column, f),
            }),
            Node::As(alias) => Node::As(As {
                value: map_box(&alias.value, f),
                column: map_box(&alias.column, f),
            }),

            Node::Function(function) => Node::Function(Function {
                name: function.name.clone(),
                arguments: map_vec(&function.arguments, f),
            }),

            Node::Sum(node) => Node::Sum(map_box(node, f)),
            Node::Minimum(node) => Node::Minimum(map_box(node, f)),
            Node::Maximum(node) => Node::Maximum(map_box(node, f)),
            Node::Average(node) => Node::Average(map_box(node, f)),
            Node::Count(node) => Node::Count(map_box(node, f)),

            Node::True => Node::True,
            Node::False => Node::False,
            Node::Null => Node::Null,
            Node::String(value) => Node::String(value.clone()),
            Node::Integer(value) => Node::Integer(*value),
            Node::Float(value) => Node::Float(*value),
            Node::Date(value) => Node::Date(value.clone()),
            Node::DateTime(value) => Node::DateTime(value.clone()),
        }
    }
}

impl Select {
    fn children(&self) -> Vec<&Node> {
        let mut children = vec![self.list.as_ref()];
        children.extend(
            [
                &self.from_clause,
                &self.where_clause,
                &self.group_by_clause,
                &self.having_clause,
                &self.order_by_clause,
                &self.limit_clause,
            ]
            .into_iter()
            .flatten()
            .map(|clause| clause.as_ref()),
        );
        children
    }

    fn map_children<F: FnMut(&Node) -> Option<Node>>(&self, f: &mut F) -> Select {
        Select {
            list: map_box(&self.list, f),
            from_clause: map_clause(&self.from_clause, f),
            where_clause: map_clause(&self.where_clause, f),
            group_by_clause: map_clause(&self.group_by_clause, f),
            having_clause: map_clause(&self.having_clause, f),
            order_by_clause: map_clause(&self.order_by_clause, f),
            limit_clause: map_clause(&self.limit_clause, f),
        }
    }

    /// Maps the whole statement, `f` sees the statement node itself first.
    ///
    /// If `f` replaces the statement with something other than a `Select`,
    /// the statement is returned unchanged.
    pub fn map<F: FnMut(&Node) -> Option<Node>>(&self, f: &mut F) -> Select {
        match Node::Select(self.clone()).map(f) {
            Node::Select(select) => select,
            other => {
                log::warn!("Ignoring replacement of a statement by {:?}", other.kind());
                self.clone()
            }
        }
    }

    /// Visits the projection and every present clause in pre-order.
    ///
    /// The statement itself is not reported to `f`; wrap it with
    /// `Node::from` and use [`Node::visit`] when the root is needed too.
    pub fn visit<F: FnMut(&Node)>(&self, f: &mut F) {
        for child in self.children() {
            child.visit(f);
        }
    }
}

fn map_box<F: FnMut(&Node) -> Option<Node>>(node: &Node, f: &mut F) -> Box<Node> {
    Box::new(node.map(f))
}

fn map_vec<F: FnMut(&Node) -> Option<Node>>(nodes: &[Node], f: &mut F) -> Vec<Node> {
    nodes.iter().map(|node| node.map(f)).collect()
}

fn map_clause<F: FnMut(&Node) -> Option<Node>>(
    clause: &Option<Box<Node>>,
    f: &mut F,
) -> Option<Box<Node>> {
    clause.as_ref().map(|node| map_box(node, f))
}

fn map_binary<F: FnMut(&Node) -> Option<Node>>(binary: &Binary, f: &mut F) -> Binary {
    Binary {
        left: map_box(&binary.left, f),
        right: map_box(&binary.right, f),
    }
}

fn map_between<F: FnMut(&Node) -> Option<Node>>(between: &Between, f: &mut F) -> Between {
    Between {
        left: map_box(&between.left, f),
        min: map_box(&between.min, f),
        max: map_box(&between.max, f),
    }
}

fn map_qualified_join<F: FnMut(&Node) -> Option<Node>>(
    join: &QualifiedJoin,
    f: &mut F,
) -> QualifiedJoin {
    QualifiedJoin {
        left: map_box(&join.left, f),
        right: map_box(&join.right, f),
        search_condition: map_box(&join.search_condition, f),
    }
}

/// Calls `f` on every node of `node` in pre-order.
pub fn visit<F: FnMut(&Node)>(node: &Node, mut f: F) {
    node.visit(&mut f)
}

/// Returns a rewritten copy of `node`, see [`Node::map`].
pub fn map<F: FnMut(&Node) -> Option<Node>>(node: &Node, mut f: F) -> Node {
    node.map(&mut f)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ast::NodeKind;
    use crate::parser::parse_sql;

    fn parse_node(sql: &str) -> Node {
        Node::Select(parse_sql(sql).expect("sql should parse"))
    }

    #[test]
    fn test_visit_is_pre_order() {
        let tree = parse_node("SELECT a + 1 FROM t");
        let mut kinds = vec![];
        visit(&tree, |node| kinds.push(node.kind()));
        assert_eq!(
            kinds,
            vec![
                NodeKind::Select,
                NodeKind::SelectList,
                NodeKind::Add,
                NodeKind::Column,
                NodeKind::Integer,
                NodeKind::FromClause,
                NodeKind::Table,
            ]
        );
    }

    #[test]
    fn test_visit_counts_match_map_calls() {
        let tree = parse_node(
            "SELECT DISTINCT t.a, COUNT(*) AS n, f(1, 'x') FROM t LEFT OUTER JOIN u USING (a) \
             WHERE t.b BETWEEN 1 AND 10 AND NOT EXISTS (SELECT 1 FROM v WHERE v.a = t.a) \
             GROUP BY t.a HAVING COUNT(*) > 2 ORDER BY n DESC LIMIT 10 OFFSET 5",
        );
        let mut visited = 0;
        visit(&tree, |_| visited += 1);
        let mut mapped = 0;
        map(&tree, |_| {
            mapped += 1;
            None
        });
        assert_eq!(visited, mapped);
        assert!(visited > 30);
    }

    #[test]
    fn test_visit_skips_limit_values() {
        let tree = parse_node("SELECT a FROM t LIMIT 5 OFFSET 3");
        let mut counts: HashMap<NodeKind, usize> = HashMap::new();
        visit(&tree, |node| *counts.entry(node.kind()).or_default() += 1);
        assert_eq!(counts.get(&NodeKind::LimitClause), Some(&1));
        assert_eq!(counts.get(&NodeKind::Integer), None);
    }

    #[test]
    fn test_select_visit_skips_only_the_statement() {
        let select = parse_sql("SELECT a FROM t WHERE a IN (SELECT b FROM u) LIMIT 1")
            .expect("sql should parse");
        let mut kinds = vec![];
        select.visit(&mut |node: &Node| kinds.push(node.kind()));

        let mut all_kinds = vec![];
        visit(&Node::from(select), |node| all_kinds.push(node.kind()));
        assert_eq!(all_kinds[0], NodeKind::Select);
        assert_eq!(kinds, all_kinds[1..].to_vec());
        assert_eq!(kinds.first(), Some(&NodeKind::SelectList));
        assert_eq!(kinds.last(), Some(&NodeKind::LimitClause));
    }

    #[test]
    fn test_map_identity() {
        let tree = parse_node("SELECT a, b FROM t JOIN u ON t.x = u.x WHERE a IN (1, 2)");
        assert_eq!(map(&tree, |_| None), tree);
    }

    #[test]
    fn test_map_replaces_matching_subtrees_only() {
        let tree = parse_node("SELECT a FROM t WHERE a = 1 OR b = 1");
        let target = Node::Integer(1);
        let mapped = map(&tree, |node| {
            if *node == target {
                Some(Node::Integer(2))
            } else {
                None
            }
        });
        assert_eq!(mapped, parse_node("SELECT a FROM t WHERE a = 2 OR b = 2"));
    }

    #[test]
    fn test_map_does_not_descend_into_replacement() {
        let tree = parse_node("SELECT a FROM t WHERE x IN (SELECT a FROM u)");
        let mut seen_inner_table = false;
        let mapped = map(&tree, |node| match node {
            Node::Subquery(_) => Some(Node::InValueList(vec![Node::column("a")])),
            Node::Table(name) if name == "u" => {
                seen_inner_table = true;
                None
            }
            _ => None,
        });
        assert!(!seen_inner_table);
        assert_eq!(mapped, parse_node("SELECT a FROM t WHERE x IN (a)"));
    }

    #[test]
    fn test_select_map_renames_tables() {
        let select = parse_sql("SELECT t.a FROM t, t AS t2").expect("sql should parse");
        let renamed = select.map(&mut |node| match node {
            Node::Table(name) if name == "t" => Some(Node::table("renamed")),
            _ => None,
        });
        assert_eq!(
            renamed,
            parse_sql("SELECT renamed.a FROM renamed, renamed AS t2").expect("sql should parse")
        );
        // the original tree is untouched
        assert_eq!(
            select,
            parse_sql("SELECT t.a FROM t, t AS t2").expect("sql should parse")
        );
    }
}
