use std::fmt;

use crate::ast::{Between, Binary, Function, Node, QualifiedJoin, Select, keyword};
use crate::parser::is_aggregate_name;

/// Renders `node` as canonical SQL text.
///
/// The output re-parses into a tree equal to `node` for every tree produced
/// by the parser: and/or and arithmetic are always parenthesized, and
/// predicates nested inside comparisons, arithmetic or signs get explicit
/// grouping.
pub fn to_sql(node: &Node) -> String {
    match node {
        Node::Select(select) => select_to_sql(select),
        Node::Subquery(select) => format!("({})", to_sql(select)),

        Node::SelectList(items) => join_nodes(items),
        Node::Distinct(items) => format!("DISTINCT {}", join_nodes(items)),
        Node::All => "*".to_owned(),

        Node::FromClause(tables) => format!("FROM {}", join_nodes(tables)),
        Node::WhereClause(condition) => format!("WHERE {}", to_sql(condition)),
        Node::GroupByClause(columns) => format!("GROUP BY {}", join_nodes(columns)),
        Node::HavingClause(condition) => format!("HAVING {}", to_sql(condition)),
        Node::OrderClause(columns) => format!("ORDER BY {}", join_nodes(columns)),
        Node::LimitClause(limit) => match limit.offset {
            Some(offset) => format!("LIMIT {} OFFSET {}", limit.count, offset),
            None => format!("LIMIT {}", limit.count),
        },

        Node::Ascending(expr) => format!("{} ASC", to_sql(expr)),
        Node::Descending(expr) => format!("{} DESC", to_sql(expr)),

        Node::Or(_) => grouped(Tier::Or, node),
        Node::And(_) => grouped(Tier::And, node),

        Node::Equals(binary) => predicate(binary, "="),
        Node::NotEquals(binary) => predicate(binary, "<>"),
        Node::Greater(binary) => predicate(binary, ">"),
        Node::Less(binary) => predicate(binary, "<"),
        Node::GreaterOrEquals(binary) => predicate(binary, ">="),
        Node::LessOrEquals(binary) => predicate(binary, "<="),
        Node::Is(binary) => predicate(binary, "IS"),
        Node::IsNot(binary) => predicate(binary, "IS NOT"),
        Node::Like(binary) => predicate(binary, "LIKE"),
        Node::NotLike(binary) => predicate(binary, "NOT LIKE"),
        Node::In(binary) => predicate(binary, "IN"),
        Node::NotIn(binary) => predicate(binary, "NOT IN"),

        Node::Between(between) => between_to_sql(between, "BETWEEN"),
        Node::NotBetween(between) => between_to_sql(between, "NOT BETWEEN"),
        Node::InValueList(values) => format!("({})", join_nodes(values)),
        Node::Exists(subquery) => format!("EXISTS {}", to_sql(subquery)),

        Node::Multiply(_) | Node::Divide(_) => grouped(Tier::Multiplicative, node),
        Node::Add(_) | Node::Subtract(_) => grouped(Tier::Additive, node),

        Node::Not(expr) => format!("NOT {}", to_sql(expr)),
        Node::UnaryPlus(expr) => signed('+', expr),
        Node::UnaryMinus(expr) => signed('-', expr),

        Node::CrossJoin(join) => format!(
            "{} CROSS JOIN {}",
            to_sql(&join.left),
            join_operand(&join.right)
        ),
        Node::InnerJoin(join) => qualified_join(join, "INNER JOIN"),
        Node::LeftJoin(join) => qualified_join(join, "LEFT JOIN"),
        Node::LeftOuterJoin(join) => qualified_join(join, "LEFT OUTER JOIN"),
        Node::RightJoin(join) => qualified_join(join, "RIGHT JOIN"),
        Node::RightOuterJoin(join) => qualified_join(join, "RIGHT OUTER JOIN"),
        Node::FullJoin(join) => qualified_join(join, "FULL JOIN"),
        Node::FullOuterJoin(join) => qualified_join(join, "FULL OUTER JOIN"),
        Node::On(condition) => format!("ON {}", to_sql(condition)),
        Node::Using(columns) => format!("USING ({})", join_nodes(columns)),

        Node::Table(name) | Node::Column(name) => quote_identifier(name),
        Node::QualifiedColumn(qualified) => {
            format!("{}.{}", to_sql(&qualified.table), to_sql(&qualified.column))
        }
        Node::As(alias) => format!("{} AS {}", to_sql(&alias.value), to_sql(&alias.column)),

        Node::Function(function) => function_to_sql(function),

        Node::Sum(expr) => format!("SUM({})", to_sql(expr)),
        Node::Minimum(expr) => format!("MIN({})", to_sql(expr)),
        Node::Maximum(expr) => format!("MAX({})", to_sql(expr)),
        Node::Average(expr) => format!("AVG({})", to_sql(expr)),
        Node::Count(expr) => format!("COUNT({})", to_sql(expr)),

        Node::True => "TRUE".to_owned(),
        Node::False => "FALSE".to_owned(),
        Node::Null => "NULL".to_owned(),
        Node::String(value) | Node::DateTime(value) => quote_string(value),
        Node::Integer(value) => value.to_string(),
        // Debug keeps a `.` or an exponent so the literal scans back as a float
        Node::Float(value) => format!("{:?}", value),
        Node::Date(value) => format!("DATE {}", quote_string(value)),
    }
}

fn select_to_sql(select: &Select) -> String {
    let mut sql = format!("SELECT {}", to_sql(&select.list));
    for clause in [
        &select.from_clause,
        &select.where_clause,
        &select.group_by_clause,
        &select.having_clause,
        &select.order_by_clause,
        &select.limit_clause,
    ]
    .into_iter()
    .flatten()
    {
        sql.push(' ');
        sql.push_str(&to_sql(clause));
    }
    sql
}

fn join_nodes(nodes: &[Node]) -> String {
    nodes.iter().map(to_sql).collect::<Vec<_>>().join(", ")
}

// Operands of predicates, arithmetic and unary operators.
fn operand(node: &Node) -> String {
    if node.is_predicate() {
        format!("({})", to_sql(node))
    } else {
        to_sql(node)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Tier {
    Or,
    And,
    Additive,
    Multiplicative,
}

fn grouped_operator(node: &Node) -> Option<(Tier, &Binary, &'static str)> {
    match node {
        Node::Or(binary) => Some((Tier::Or, binary, "OR")),
        Node::And(binary) => Some((Tier::And, binary, "AND")),
        Node::Add(binary) => Some((Tier::Additive, binary, "+")),
        Node::Subtract(binary) => Some((Tier::Additive, binary, "-")),
        Node::Multiply(binary) => Some((Tier::Multiplicative, binary, "*")),
        Node::Divide(binary) => Some((Tier::Multiplicative, binary, "/")),
        _ => None,
    }
}

fn chain_operand(tier: Tier, node: &Node) -> String {
    match tier {
        Tier::Or | Tier::And => to_sql(node),
        Tier::Additive | Tier::Multiplicative => operand(node),
    }
}

// A left-leaning run of same-tier operators shares one pair of parentheses,
// `((a + b) - c)` is written `(a + b - c)`. Both parse left-associatively.
fn grouped(tier: Tier, node: &Node) -> String {
    let mut head = node;
    let mut tail = vec![];
    loop {
        match grouped_operator(head) {
            Some((head_tier, binary, operator)) if head_tier == tier => {
                tail.push((operator, binary.right.as_ref()));
                head = binary.left.as_ref();
            }
            _ => break,
        }
    }

    let mut sql = format!("({}", chain_operand(tier, head));
    for (operator, right) in tail.into_iter().rev() {
        sql.push_str(&format!(" {} {}", operator, chain_operand(tier, right)));
    }
    sql.push(')');
    sql
}

fn predicate(binary: &Binary, operator: &str) -> String {
    format!(
        "{} {} {}",
        operand(&binary.left),
        operator,
        operand(&binary.right)
    )
}

fn between_to_sql(between: &Between, operator: &str) -> String {
    format!(
        "{} {} {} AND {}",
        operand(&between.left),
        operator,
        operand(&between.min),
        operand(&between.max)
    )
}

fn signed(sign: char, expr: &Node) -> String {
    let operand = operand(expr);
    if operand.starts_with(sign) {
        format!("{} {}", sign, operand)
    } else {
        format!("{}{}", sign, operand)
    }
}

fn join_operand(node: &Node) -> String {
    if node.is_join() {
        format!("({})", to_sql(node))
    } else {
        to_sql(node)
    }
}

fn qualified_join(join: &QualifiedJoin, operator: &str) -> String {
    format!(
        "{} {} {} {}",
        to_sql(&join.left),
        operator,
        join_operand(&join.right),
        to_sql(&join.search_condition)
    )
}

fn function_to_sql(function: &Function) -> String {
    let name = if is_plain_identifier(&function.name) && !is_aggregate_name(&function.name) {
        function.name.clone()
    } else {
        quote_identifier(&function.name)
    };
    format!("{}({})", name, join_nodes(&function.arguments))
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && keyword(&name.to_lowercase()).is_none()
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl Node {
    pub fn to_sql(&self) -> String {
        to_sql(self)
    }
}

impl Select {
    pub fn to_sql(&self) -> String {
        select_to_sql(self)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_sql(self))
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&select_to_sql(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{As, Limit};
    use crate::parser::parse_sql;

    fn canonical(sql: &str) -> String {
        parse_sql(sql).expect("sql should parse").to_sql()
    }

    #[test]
    fn test_render_clauses() {
        assert_eq!(
            canonical("select a, b as c from t where a = 1 group by a having count(*) > 1 order by a desc, b limit 3 offset 2"),
            "SELECT `a`, `b` AS `c` FROM `t` WHERE `a` = 1 GROUP BY `a` HAVING COUNT(*) > 1 \
             ORDER BY `a` DESC, `b` ASC LIMIT 3 OFFSET 2"
        );
    }

    #[test]
    fn test_render_projection() {
        assert_eq!(canonical("SELECT *"), "SELECT *");
        assert_eq!(canonical("SELECT DISTINCT *"), "SELECT DISTINCT *");
        assert_eq!(canonical("SELECT *, a"), "SELECT *, `a`");
    }

    #[test]
    fn test_render_logic_and_arithmetic_grouping() {
        assert_eq!(
            canonical("SELECT 1 + 2 * 3 FROM t WHERE a OR b AND c"),
            "SELECT (1 + (2 * 3)) FROM `t` WHERE (`a` OR (`b` AND `c`))"
        );
    }

    #[test]
    fn test_render_left_chains_share_parentheses() {
        assert_eq!(
            canonical("SELECT 1 - 2 + 3 * 4 / 5, 1 - (2 + 3)"),
            "SELECT (1 - 2 + (3 * 4 / 5)), (1 - (2 + 3))"
        );
        assert_eq!(
            canonical("SELECT a FROM t WHERE a OR b OR c AND d AND e"),
            "SELECT `a` FROM `t` WHERE (`a` OR `b` OR (`c` AND `d` AND `e`))"
        );
        assert_eq!(
            canonical("SELECT (a = 1) + 2 - 3"),
            "SELECT ((`a` = 1) + 2 - 3)"
        );
    }

    #[test]
    fn test_render_nested_predicates() {
        assert_eq!(canonical("SELECT (a = b) = c"), "SELECT (`a` = `b`) = `c`");
        assert_eq!(canonical("SELECT NOT a = 1"), "SELECT NOT `a` = 1");
        assert_eq!(canonical("SELECT NOT NOT a"), "SELECT NOT NOT `a`");
        assert_eq!(canonical("SELECT -(a > 1)"), "SELECT -(`a` > 1)");
    }

    #[test]
    fn test_render_negated_predicates() {
        assert_eq!(
            canonical(
                "SELECT a FROM t WHERE a != 1 AND b IS NOT NULL AND c NOT LIKE 'x%' \
                 AND d NOT IN (1, 2) AND e NOT BETWEEN 1 AND 5"
            ),
            "SELECT `a` FROM `t` WHERE (`a` <> 1 AND `b` IS NOT NULL AND `c` NOT LIKE 'x%' \
             AND `d` NOT IN (1, 2) AND `e` NOT BETWEEN 1 AND 5)"
        );
    }

    #[test]
    fn test_render_unary_signs_never_form_comments() {
        assert_eq!(canonical("SELECT - -1"), "SELECT - -1");
        assert_eq!(canonical("SELECT -+1"), "SELECT -+1");
        assert_eq!(canonical("SELECT a - -b"), "SELECT (`a` - -`b`)");
    }

    #[test]
    fn test_render_joins() {
        assert_eq!(
            canonical("SELECT * FROM a JOIN b ON a.x = b.x LEFT OUTER JOIN c USING (x, y) CROSS JOIN d"),
            "SELECT * FROM `a` INNER JOIN `b` ON `a`.`x` = `b`.`x` LEFT OUTER JOIN `c` USING (`x`, `y`) \
             CROSS JOIN `d`"
        );
        assert_eq!(
            canonical("SELECT * FROM a FULL JOIN (b RIGHT JOIN c ON b.x = c.x) ON a.x = b.x"),
            "SELECT * FROM `a` FULL JOIN (`b` RIGHT JOIN `c` ON `b`.`x` = `c`.`x`) ON `a`.`x` = `b`.`x`"
        );
    }

    #[test]
    fn test_render_subqueries() {
        assert_eq!(
            canonical("SELECT a FROM (SELECT a FROM t) s WHERE EXISTS (SELECT 1) AND a IN (SELECT b FROM u)"),
            "SELECT `a` FROM (SELECT `a` FROM `t`) AS `s` WHERE (EXISTS (SELECT 1) AND `a` IN (SELECT `b` FROM `u`))"
        );
    }

    #[test]
    fn test_render_literals() {
        assert_eq!(
            canonical("SELECT 'it''s', 1.5, 2e3, .5, TRUE, FALSE, NULL, DATE '2024-01-31', '2024-01-31 10:00:00'"),
            "SELECT 'it''s', 1.5, 2000.0, 0.5, TRUE, FALSE, NULL, DATE '2024-01-31', '2024-01-31 10:00:00'"
        );
    }

    #[test]
    fn test_render_identifiers_and_functions() {
        assert_eq!(
            canonical("SELECT `we``ird`, coalesce(a, 0), `left`(a), `sum`(a), max(a, b), now(), avg(x)"),
            "SELECT `we``ird`, coalesce(`a`, 0), `left`(`a`), `sum`(`a`), `max`(`a`, `b`), now(), AVG(`x`)"
        );
    }

    #[test]
    fn test_render_built_tree() {
        let mut select = Select::new(Node::SelectList(vec![Node::As(As {
            value: Box::new(Node::qualified_column("t", "a")),
            column: Box::new(Node::column("x")),
        })]));
        select.from_clause = Some(Box::new(Node::FromClause(vec![Node::table("t")])));
        select.limit_clause = Some(Box::new(Node::LimitClause(Limit {
            count: 5,
            offset: None,
        })));
        assert_eq!(select.to_string(), "SELECT `t`.`a` AS `x` FROM `t` LIMIT 5");
        assert_eq!(Node::from(select).to_string(), "SELECT `t`.`a` AS `x` FROM `t` LIMIT 5");
    }
}
