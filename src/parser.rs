use strum::IntoDiscriminant;

use crate::ast::{
    As, Between, Binary, Function, Join, Limit, Node, QualifiedColumn, QualifiedJoin, Select,
    Token, TokenType, TokenTypeVariant,
};
use crate::error::{self, ParseError};
use crate::scanner::Scanner;

const AGGREGATES: [&str; 5] = ["sum", "min", "max", "avg", "count"];

pub(crate) fn is_aggregate_name(name: &str) -> bool {
    AGGREGATES.contains(&name.to_lowercase().as_str())
}

type BinaryBuilder = fn(Binary) -> Node;

const MAX_NESTING_DEPTH: usize = 64;

pub struct Parser<'a> {
    source_tokens: &'a [Token],
    curr: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        Self {
            source_tokens: tokens,
            curr: 0,
            depth: 0,
        }
    }

    /// Parses exactly one statement, optionally terminated by `;`.
    pub fn parse(&mut self) -> Result<Select, ParseError> {
        let select = self.parse_select()?;
        self.match_token_type(TokenTypeVariant::Semicolon);
        if !self.check_token_type(TokenTypeVariant::Eof) {
            return Err(self.error(
                self.peek(),
                "Unexpected token after end of statement.",
                &["EOF"],
            ));
        }
        Ok(select)
    }

    fn peek_prev(&self) -> &Token {
        &self.source_tokens[self.curr - 1]
    }

    fn peek(&self) -> &Token {
        self.peek_next_i(0)
    }

    fn peek_next_i(&self, i: usize) -> &Token {
        if self.curr + i >= self.source_tokens.len() {
            // Eof
            &self.source_tokens[self.source_tokens.len() - 1]
        } else {
            &self.source_tokens[self.curr + i]
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            // Do not advance if we peek Eof
            self.curr += 1;
        }
        self.peek_prev()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenType::Eof
    }

    fn check_token_type(&self, token_type: TokenTypeVariant) -> bool {
        self.peek().kind.discriminant() == token_type
    }

    fn match_token_type(&mut self, token_type: TokenTypeVariant) -> bool {
        if self.check_token_type(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check_identifier(&self) -> bool {
        self.check_token_type(TokenTypeVariant::Identifier)
            || self.check_token_type(TokenTypeVariant::QuotedIdentifier)
    }

    fn check_expr_start(&self) -> bool {
        matches!(
            self.peek().kind.discriminant(),
            TokenTypeVariant::Identifier
                | TokenTypeVariant::QuotedIdentifier
                | TokenTypeVariant::String
                | TokenTypeVariant::Integer
                | TokenTypeVariant::Float
                | TokenTypeVariant::True
                | TokenTypeVariant::False
                | TokenTypeVariant::Null
                | TokenTypeVariant::Date
                | TokenTypeVariant::Exists
                | TokenTypeVariant::Not
                | TokenTypeVariant::Plus
                | TokenTypeVariant::Minus
                | TokenTypeVariant::LeftParen
        )
    }

    fn consume(&mut self, token_type: TokenTypeVariant) -> Result<&Token, ParseError> {
        if self.check_token_type(token_type) {
            Ok(self.advance())
        } else {
            let err_msg = format!("Expected `{}`.", token_type.variant_str());
            Err(self.error(self.peek(), &err_msg, &[token_type.variant_str()]))
        }
    }

    fn consume_one_of(
        &mut self,
        token_types: &[TokenTypeVariant],
    ) -> Result<&Token, ParseError> {
        for token_type in token_types {
            if self.check_token_type(*token_type) {
                return Ok(self.advance());
            }
        }
        let expected = token_types
            .iter()
            .map(|el| el.variant_str())
            .collect::<Vec<&str>>();
        let err_msg = expected
            .iter()
            .map(|el| format!("`{}`", el))
            .collect::<Vec<String>>()
            .join(" or ");
        Err(self.error(
            self.peek(),
            &format!("Expected one of: {}.", err_msg),
            &expected,
        ))
    }

    fn consume_identifier(&mut self, construct: &str) -> Result<String, ParseError> {
        let name = match &self.peek().kind {
            TokenType::Identifier(name) | TokenType::QuotedIdentifier(name) => Some(name.clone()),
            _ => None,
        };
        match name {
            Some(name) => {
                self.advance();
                Ok(name)
            }
            None => Err(self.error(
                self.peek(),
                &format!("Expected {}.", construct),
                &["Identifier", "QuotedIdentifier"],
            )),
        }
    }

    /// Runs a rule that may recurse back into itself, bounding how deep
    /// parentheses, subqueries and prefix operators can nest.
    fn nested<T>(
        &mut self,
        rule: impl Fn(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(self.peek(), "Maximum nesting depth exceeded.", &[]));
        }
        self.depth += 1;
        let output = rule(self);
        self.depth -= 1;
        output
    }

    fn error(&self, token: &Token, message: &str, expected: &[&str]) -> ParseError {
        ParseError {
            message: message.to_owned(),
            found: token.lexeme.clone(),
            expected: expected.iter().map(|el| (*el).to_owned()).collect(),
            line: token.line,
            col: token.col,
        }
    }

    // select ->
    // "SELECT"
    // ["DISTINCT"]
    // select_list
    // ["FROM" table_reference ("," table_reference)*]
    // ["WHERE" expr]
    // ["GROUP" "BY" expr ("," expr)*]
    // ["HAVING" expr]
    // ["ORDER" "BY" order_by_item ("," order_by_item)*]
    // ["LIMIT" "Integer" ["OFFSET" "Integer"]]
    fn parse_select(&mut self) -> Result<Select, ParseError> {
        self.consume(TokenTypeVariant::Select)?;

        let distinct = self.match_token_type(TokenTypeVariant::Distinct);
        let list = self.parse_select_list(distinct)?;
        let mut select = Select::new(list);

        if self.match_token_type(TokenTypeVariant::From) {
            let mut tables = vec![self.parse_table_reference()?];
            while self.match_token_type(TokenTypeVariant::Comma) {
                tables.push(self.parse_table_reference()?);
            }
            select.from_clause = Some(Box::new(Node::FromClause(tables)));
        }

        if self.match_token_type(TokenTypeVariant::Where) {
            select.where_clause = Some(Box::new(Node::WhereClause(Box::new(self.parse_expr()?))));
        }

        if self.match_token_type(TokenTypeVariant::Group) {
            self.consume(TokenTypeVariant::By)?;
            let mut columns = vec![self.parse_expr()?];
            while self.match_token_type(TokenTypeVariant::Comma) {
                columns.push(self.parse_expr()?);
            }
            select.group_by_clause = Some(Box::new(Node::GroupByClause(columns)));
        }

        if self.match_token_type(TokenTypeVariant::Having) {
            select.having_clause =
                Some(Box::new(Node::HavingClause(Box::new(self.parse_expr()?))));
        }

        if self.match_token_type(TokenTypeVariant::Order) {
            self.consume(TokenTypeVariant::By)?;
            let mut columns = vec![self.parse_order_by_item()?];
            while self.match_token_type(TokenTypeVariant::Comma) {
                columns.push(self.parse_order_by_item()?);
            }
            select.order_by_clause = Some(Box::new(Node::OrderClause(columns)));
        }

        if self.match_token_type(TokenTypeVariant::Limit) {
            let count = self.parse_unsigned_integer()?;
            let offset = if self.match_token_type(TokenTypeVariant::Offset) {
                Some(self.parse_unsigned_integer()?)
            } else {
                None
            };
            select.limit_clause = Some(Box::new(Node::LimitClause(Limit { count, offset })));
        }

        Ok(select)
    }

    // select_list -> "*" | select_item ("," select_item)*
    fn parse_select_list(&mut self, distinct: bool) -> Result<Node, ParseError> {
        if !(self.check_expr_start() || self.check_token_type(TokenTypeVariant::Star)) {
            return Err(self.error(self.peek(), "Expected select list.", &["*", "expression"]));
        }

        let mut columns = vec![self.parse_select_item()?];
        while self.match_token_type(TokenTypeVariant::Comma) {
            columns.push(self.parse_select_item()?);
        }

        if distinct {
            Ok(Node::Distinct(columns))
        } else if columns.len() == 1 && columns[0] == Node::All {
            Ok(Node::All)
        } else {
            Ok(Node::SelectList(columns))
        }
    }

    // select_item -> "*" | expr [as_alias]
    fn parse_select_item(&mut self) -> Result<Node, ParseError> {
        if self.match_token_type(TokenTypeVariant::Star) {
            return Ok(Node::All);
        }
        let expr = self.parse_expr()?;
        self.parse_aliased(expr)
    }

    // as_alias -> ["AS"] ("Identifier" | "QuotedIdentifier")
    fn parse_as_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.match_token_type(TokenTypeVariant::As) {
            return Ok(Some(self.consume_identifier("alias")?));
        }
        if self.check_identifier() {
            return Ok(Some(self.consume_identifier("alias")?));
        }
        Ok(None)
    }

    fn parse_aliased(&mut self, value: Node) -> Result<Node, ParseError> {
        Ok(match self.parse_as_alias()? {
            Some(alias) => Node::As(As {
                value: Box::new(value),
                column: Box::new(Node::Column(alias)),
            }),
            None => value,
        })
    }

    // order_by_item -> expr [("ASC" | "DESC")]
    fn parse_order_by_item(&mut self) -> Result<Node, ParseError> {
        let expr = Box::new(self.parse_expr()?);
        if self.match_token_type(TokenTypeVariant::Desc) {
            Ok(Node::Descending(expr))
        } else {
            self.match_token_type(TokenTypeVariant::Asc);
            Ok(Node::Ascending(expr))
        }
    }

    fn parse_unsigned_integer(&mut self) -> Result<u64, ParseError> {
        let tok = self.consume(TokenTypeVariant::Integer)?.clone();
        tok.lexeme
            .parse::<u64>()
            .map_err(|_| self.error(&tok, "Integer literal out of range.", &["Integer"]))
    }

    // table_reference -> table_primary (cross_join_op table_primary | cond_join_op table_primary cond)*
    // where:
    // cross_join_op -> "CROSS" "JOIN"
    // cond_join_op -> ["INNER"] "JOIN" | ("LEFT" | "RIGHT" | "FULL") ["OUTER"] "JOIN"
    fn parse_table_reference(&mut self) -> Result<Node, ParseError> {
        let mut output = self.parse_table_primary()?;

        loop {
            let join: fn(QualifiedJoin) -> Node = match self.peek().kind.discriminant() {
                TokenTypeVariant::Cross => {
                    self.advance();
                    self.consume(TokenTypeVariant::Join)?;
                    let right = self.parse_table_primary()?;
                    output = Node::CrossJoin(Join {
                        left: Box::new(output),
                        right: Box::new(right),
                    });
                    continue;
                }
                TokenTypeVariant::Inner | TokenTypeVariant::Join => {
                    self.match_token_type(TokenTypeVariant::Inner);
                    Node::InnerJoin
                }
                TokenTypeVariant::Left => {
                    self.advance();
                    if self.match_token_type(TokenTypeVariant::Outer) {
                        Node::LeftOuterJoin
                    } else {
                        Node::LeftJoin
                    }
                }
                TokenTypeVariant::Right => {
                    self.advance();
                    if self.match_token_type(TokenTypeVariant::Outer) {
                        Node::RightOuterJoin
                    } else {
                        Node::RightJoin
                    }
                }
                TokenTypeVariant::Full => {
                    self.advance();
                    if self.match_token_type(TokenTypeVariant::Outer) {
                        Node::FullOuterJoin
                    } else {
                        Node::FullJoin
                    }
                }
                _ => break,
            };
            self.consume(TokenTypeVariant::Join)?;
            let right = self.parse_table_primary()?;
            let search_condition = self.parse_join_condition()?;
            output = join(QualifiedJoin {
                left: Box::new(output),
                right: Box::new(right),
                search_condition: Box::new(search_condition),
            });
        }

        Ok(output)
    }

    // cond -> "ON" expr | "USING" "(" column ("," column)* ")"
    fn parse_join_condition(&mut self) -> Result<Node, ParseError> {
        if self.match_token_type(TokenTypeVariant::On) {
            Ok(Node::On(Box::new(self.parse_expr()?)))
        } else if self.match_token_type(TokenTypeVariant::Using) {
            self.consume(TokenTypeVariant::LeftParen)?;
            let mut columns = vec![Node::Column(self.consume_identifier("column name")?)];
            while self.match_token_type(TokenTypeVariant::Comma) {
                columns.push(Node::Column(self.consume_identifier("column name")?));
            }
            self.consume(TokenTypeVariant::RightParen)?;
            Ok(Node::Using(columns))
        } else {
            Err(self.error(self.peek(), "Expected `ON` or `USING`.", &["ON", "USING"]))
        }
    }

    // table_primary -> table [as_alias] | "(" select ")" [as_alias] | "(" table_reference ")"
    fn parse_table_primary(&mut self) -> Result<Node, ParseError> {
        if self.match_token_type(TokenTypeVariant::LeftParen) {
            if self.check_token_type(TokenTypeVariant::Select) {
                let subquery = self.parse_subquery_tail()?;
                self.parse_aliased(subquery)
            } else {
                let table_reference = self.nested(Self::parse_table_reference)?;
                self.consume(TokenTypeVariant::RightParen)?;
                Ok(table_reference)
            }
        } else {
            let table = Node::Table(self.consume_identifier("table name")?);
            self.parse_aliased(table)
        }
    }

    // Parses `select ")"`, the opening parenthesis has already been consumed.
    fn parse_subquery_tail(&mut self) -> Result<Node, ParseError> {
        let select = self.nested(Self::parse_select)?;
        self.consume(TokenTypeVariant::RightParen)?;
        Ok(Node::Subquery(Box::new(Node::Select(select))))
    }

    // expr -> or_expr
    fn parse_expr(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::parse_or_expr)
    }

    /// Util function to parse a standard left-associative binary rule of kind
    ///
    /// `parse_rule -> next_parsing_rule (("T1" | "T2" | ...) next_parsing_rule)*`
    fn parse_standard_binary_expr(
        &mut self,
        operators: &[(TokenTypeVariant, BinaryBuilder)],
        next_parsing_rule_fn: impl Fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        let mut output = next_parsing_rule_fn(self)?;

        while let Some(build) = operators
            .iter()
            .find(|(token_type, _)| self.check_token_type(*token_type))
            .map(|(_, build)| *build)
        {
            self.advance();
            let right = next_parsing_rule_fn(self)?;
            output = build(Binary::new(output, right));
        }

        Ok(output)
    }

    // or_expr -> and_expr ("OR" and_expr)*
    fn parse_or_expr(&mut self) -> Result<Node, ParseError> {
        self.parse_standard_binary_expr(
            &[(TokenTypeVariant::Or, Node::Or as BinaryBuilder)],
            Self::parse_and_expr,
        )
    }

    // and_expr -> not_expr ("AND" not_expr)*
    fn parse_and_expr(&mut self) -> Result<Node, ParseError> {
        self.parse_standard_binary_expr(
            &[(TokenTypeVariant::And, Node::And as BinaryBuilder)],
            Self::parse_not_expr,
        )
    }

    // not_expr -> "NOT" not_expr | comparison_expr
    fn parse_not_expr(&mut self) -> Result<Node, ParseError> {
        if self.match_token_type(TokenTypeVariant::Not) {
            return Ok(Node::Not(Box::new(self.nested(Self::parse_not_expr)?)));
        }
        self.parse_comparison_expr()
    }

    // comparison_expr ->
    // add_expr
    // | add_expr (("=" | "<>" | ">" | "<" | ">=" | "<=") add_expr)*
    // | add_expr "IS" ["NOT"] ("NULL" | "TRUE" | "FALSE")
    // | add_expr ["NOT"] "LIKE" add_expr
    // | add_expr ["NOT"] "IN" in_predicate_value
    // | add_expr ["NOT"] "BETWEEN" add_expr "AND" add_expr
    fn parse_comparison_expr(&mut self) -> Result<Node, ParseError> {
        let mut output = self.parse_add_expr()?;

        loop {
            let comparison: fn(Binary) -> Node = match self.peek().kind.discriminant() {
                TokenTypeVariant::Equal => Node::Equals,
                TokenTypeVariant::NotEqual => Node::NotEquals,
                TokenTypeVariant::Greater => Node::Greater,
                TokenTypeVariant::Less => Node::Less,
                TokenTypeVariant::GreaterEqual => Node::GreaterOrEquals,
                TokenTypeVariant::LessEqual => Node::LessOrEquals,
                TokenTypeVariant::Is => {
                    self.advance();
                    let negated = self.match_token_type(TokenTypeVariant::Not);
                    let right = self.parse_is_operand()?;
                    let binary = Binary::new(output, right);
                    output = if negated {
                        Node::IsNot(binary)
                    } else {
                        Node::Is(binary)
                    };
                    continue;
                }
                TokenTypeVariant::Like | TokenTypeVariant::In | TokenTypeVariant::Between => {
                    output = self.parse_negatable_predicate(output, false)?;
                    continue;
                }
                TokenTypeVariant::Not => {
                    self.advance();
                    if !matches!(
                        self.peek().kind.discriminant(),
                        TokenTypeVariant::Like | TokenTypeVariant::In | TokenTypeVariant::Between
                    ) {
                        return Err(self.error(
                            self.peek(),
                            "Expected one of: `LIKE` or `IN` or `BETWEEN`.",
                            &["LIKE", "IN", "BETWEEN"],
                        ));
                    }
                    output = self.parse_negatable_predicate(output, true)?;
                    continue;
                }
                _ => break,
            };
            self.advance();
            let right = self.parse_add_expr()?;
            output = comparison(Binary::new(output, right));
        }

        Ok(output)
    }

    fn parse_is_operand(&mut self) -> Result<Node, ParseError> {
        let tok = self.consume_one_of(&[
            TokenTypeVariant::Null,
            TokenTypeVariant::True,
            TokenTypeVariant::False,
        ])?;
        Ok(match tok.kind {
            TokenType::True => Node::True,
            TokenType::False => Node::False,
            _ => Node::Null,
        })
    }

    // Parses a `LIKE`, `IN` or `BETWEEN` tail whose left operand is `left`.
    fn parse_negatable_predicate(
        &mut self,
        left: Node,
        negated: bool,
    ) -> Result<Node, ParseError> {
        let tok = self
            .consume_one_of(&[
                TokenTypeVariant::Like,
                TokenTypeVariant::In,
                TokenTypeVariant::Between,
            ])?
            .kind
            .discriminant();
        let left = Box::new(left);
        let predicate = match tok {
            TokenTypeVariant::Like => {
                let binary = Binary {
                    left,
                    right: Box::new(self.parse_add_expr()?),
                };
                if negated {
                    Node::NotLike(binary)
                } else {
                    Node::Like(binary)
                }
            }
            TokenTypeVariant::In => {
                let binary = Binary {
                    left,
                    right: Box::new(self.parse_in_predicate_value()?),
                };
                if negated {
                    Node::NotIn(binary)
                } else {
                    Node::In(binary)
                }
            }
            _ => {
                let min = Box::new(self.parse_add_expr()?);
                self.consume(TokenTypeVariant::And)?;
                let max = Box::new(self.parse_add_expr()?);
                let between = Between { left, min, max };
                if negated {
                    Node::NotBetween(between)
                } else {
                    Node::Between(between)
                }
            }
        };
        Ok(predicate)
    }

    // in_predicate_value -> "(" select ")" | "(" expr ("," expr)* ")"
    fn parse_in_predicate_value(&mut self) -> Result<Node, ParseError> {
        self.consume(TokenTypeVariant::LeftParen)?;
        if self.check_token_type(TokenTypeVariant::Select) {
            return self.parse_subquery_tail();
        }
        let mut values = vec![self.parse_expr()?];
        while self.match_token_type(TokenTypeVariant::Comma) {
            values.push(self.parse_expr()?);
        }
        self.consume(TokenTypeVariant::RightParen)?;
        Ok(Node::InValueList(values))
    }

    // add_expr -> mul_expr (("+" | "-") mul_expr)*
    fn parse_add_expr(&mut self) -> Result<Node, ParseError> {
        self.parse_standard_binary_expr(
            &[
                (TokenTypeVariant::Plus, Node::Add as BinaryBuilder),
                (TokenTypeVariant::Minus, Node::Subtract as BinaryBuilder),
            ],
            Self::parse_mul_expr,
        )
    }

    // mul_expr -> unary_expr (("*" | "/") unary_expr)*
    fn parse_mul_expr(&mut self) -> Result<Node, ParseError> {
        self.parse_standard_binary_expr(
            &[
                (TokenTypeVariant::Star, Node::Multiply as BinaryBuilder),
                (TokenTypeVariant::Slash, Node::Divide as BinaryBuilder),
            ],
            Self::parse_unary_expr,
        )
    }

    // unary_expr -> ("+" | "-") unary_expr | primary_expr
    fn parse_unary_expr(&mut self) -> Result<Node, ParseError> {
        if self.match_token_type(TokenTypeVariant::Plus) {
            return Ok(Node::UnaryPlus(Box::new(self.nested(Self::parse_unary_expr)?)));
        }
        if self.match_token_type(TokenTypeVariant::Minus) {
            return Ok(Node::UnaryMinus(Box::new(self.nested(Self::parse_unary_expr)?)));
        }
        self.parse_primary_expr()
    }

    // function_expr -> name "(" ")" | name "(" "*" ")" | name "(" expr ("," expr)* ")"
    fn parse_function_expr(
        &mut self,
        name: String,
        quoted: bool,
    ) -> Result<Node, ParseError> {
        self.consume(TokenTypeVariant::LeftParen)?;
        let lower_name = name.to_lowercase();

        if !quoted
            && lower_name == "count"
            && self.check_token_type(TokenTypeVariant::Star)
            && self.peek_next_i(1).kind == TokenType::RightParen
        {
            self.advance();
            self.advance();
            return Ok(Node::Count(Box::new(Node::All)));
        }

        let mut arguments = vec![];
        if !self.match_token_type(TokenTypeVariant::RightParen) {
            arguments.push(self.parse_expr()?);
            while self.match_token_type(TokenTypeVariant::Comma) {
                arguments.push(self.parse_expr()?);
            }
            self.consume(TokenTypeVariant::RightParen)?;
        }

        if quoted || arguments.len() != 1 {
            return Ok(Node::Function(Function { name, arguments }));
        }
        let aggregate: fn(Box<Node>) -> Node = match lower_name.as_str() {
            "sum" => Node::Sum,
            "min" => Node::Minimum,
            "max" => Node::Maximum,
            "avg" => Node::Average,
            "count" => Node::Count,
            _ => return Ok(Node::Function(Function { name, arguments })),
        };
        Ok(aggregate(Box::new(arguments.remove(0))))
    }

    // primary_expr ->
    // "TRUE" | "FALSE" | "NULL" | "String" | "Integer" | "Float"
    // | "DATE" "String"
    // | "EXISTS" "(" select ")"
    // | column | table "." column | function_expr
    // | "(" expr ")" | "(" select ")"
    fn parse_primary_expr(&mut self) -> Result<Node, ParseError> {
        let peek_token = self.peek().clone();
        let primary_expr = match peek_token.kind.clone() {
            TokenType::True => {
                self.advance();
                Node::True
            }
            TokenType::False => {
                self.advance();
                Node::False
            }
            TokenType::Null => {
                self.advance();
                Node::Null
            }
            TokenType::String(value) => {
                self.advance();
                if has_shape(&value, "dddd-dd-dd dd:dd:dd") {
                    Node::DateTime(value)
                } else {
                    Node::String(value)
                }
            }
            TokenType::Integer(lexeme) => {
                self.advance();
                let value = lexeme.parse::<i64>().map_err(|_| {
                    self.error(&peek_token, "Integer literal out of range.", &["Integer"])
                })?;
                Node::Integer(value)
            }
            TokenType::Float(lexeme) => {
                self.advance();
                let value = lexeme.parse::<f64>().map_err(|_| {
                    self.error(&peek_token, "Invalid float literal.", &["Float"])
                })?;
                if !value.is_finite() {
                    return Err(self.error(&peek_token, "Float literal out of range.", &["Float"]));
                }
                Node::Float(value)
            }
            TokenType::Date => {
                self.advance();
                let tok = self.consume(TokenTypeVariant::String)?.clone();
                match &tok.kind {
                    TokenType::String(value) if has_shape(value, "dddd-dd-dd") => {
                        Node::Date(value.clone())
                    }
                    _ => {
                        return Err(self.error(
                            &tok,
                            "Expected date literal of the form 'YYYY-MM-DD'.",
                            &["String"],
                        ));
                    }
                }
            }
            TokenType::Exists => {
                self.advance();
                self.consume(TokenTypeVariant::LeftParen)?;
                Node::Exists(Box::new(self.parse_subquery_tail()?))
            }
            TokenType::Identifier(name) | TokenType::QuotedIdentifier(name) => {
                let quoted = matches!(peek_token.kind, TokenType::QuotedIdentifier(_));
                self.advance();
                if self.check_token_type(TokenTypeVariant::LeftParen) {
                    return self.parse_function_expr(name, quoted);
                }
                if self.match_token_type(TokenTypeVariant::Dot) {
                    let column = self.consume_identifier("column name")?;
                    Node::QualifiedColumn(QualifiedColumn {
                        table: Box::new(Node::Table(name)),
                        column: Box::new(Node::Column(column)),
                    })
                } else {
                    Node::Column(name)
                }
            }
            TokenType::LeftParen => {
                self.advance();
                // Look ahead to check whether we need to parse a subquery or an expr
                if self.check_token_type(TokenTypeVariant::Select) {
                    return self.parse_subquery_tail();
                }
                let expr = self.parse_expr()?;
                self.consume(TokenTypeVariant::RightParen)?;
                expr
            }
            _ => {
                return Err(self.error(&peek_token, "Expected expression.", &["expression"]));
            }
        };

        Ok(primary_expr)
    }
}

/// Checks `value` against `shape`, where `d` stands for any ASCII digit and
/// every other character must match literally.
fn has_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.chars().zip(shape.chars()).all(|(c, s)| match s {
            'd' => c.is_ascii_digit(),
            _ => c == s,
        })
}

pub fn parse_sql(sql: &str) -> error::Result<Select> {
    log::debug!("Parsing {}", sql.chars().take(50).collect::<String>());

    let mut scanner = Scanner::new(sql);

    scanner.scan()?;

    log::debug!("Tokens:");
    scanner
        .tokens()
        .iter()
        .for_each(|tok| log::debug!("{:?}", tok));

    let mut parser = Parser::new(scanner.tokens());
    let select = parser.parse()?;
    log::debug!("AST: {:?}", select);
    Ok(select)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_shape() {
        assert!(has_shape("2024-01-31", "dddd-dd-dd"));
        assert!(has_shape("2024-01-31 23:59:00", "dddd-dd-dd dd:dd:dd"));
        assert!(!has_shape("2024-1-31", "dddd-dd-dd"));
        assert!(!has_shape("2024-01-31T23:59:00", "dddd-dd-dd dd:dd:dd"));
    }

    #[test]
    fn test_aggregate_names() {
        assert!(is_aggregate_name("COUNT"));
        assert!(is_aggregate_name("avg"));
        assert!(!is_aggregate_name("coalesce"));
    }
}
