use serde::{Deserialize, Serialize};
use strum_macros::EnumDiscriminants;

/// A `SELECT` statement. Only `list` is mandatory, every clause is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// `SelectList`, `Distinct` or `All`.
    pub list: Box<Node>,
    pub from_clause: Option<Box<Node>>,
    pub where_clause: Option<Box<Node>>,
    pub group_by_clause: Option<Box<Node>>,
    pub having_clause: Option<Box<Node>>,
    pub order_by_clause: Option<Box<Node>>,
    pub limit_clause: Option<Box<Node>>,
}

impl Select {
    pub fn new(list: Node) -> Self {
        Self {
            list: Box::new(list),
            from_clause: None,
            where_clause: None,
            group_by_clause: None,
            having_clause: None,
            order_by_clause: None,
            limit_clause: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub count: u64,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub left: Box<Node>,
    pub right: Box<Node>,
}

impl Binary {
    pub fn new(left: Node, right: Node) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Between {
    pub left: Box<Node>,
    pub min: Box<Node>,
    pub max: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub left: Box<Node>,
    pub right: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedJoin {
    pub left: Box<Node>,
    pub right: Box<Node>,
    /// `On` or `Using`.
    pub search_condition: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedColumn {
    pub table: Box<Node>,
    pub column: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct As {
    pub value: Box<Node>,
    pub column: Box<Node>,
}

/// Generic function call. Single-argument calls of the aggregate names are
/// parsed into the dedicated aggregate variants instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub arguments: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, EnumDiscriminants, Serialize, Deserialize)]
#[strum_discriminants(name(NodeKind), derive(Hash))]
pub enum Node {
    Select(Select),
    Subquery(Box<Node>),

    // Projection
    SelectList(Vec<Node>),
    Distinct(Vec<Node>),
    All,

    // Clauses
    FromClause(Vec<Node>),
    WhereClause(Box<Node>),
    GroupByClause(Vec<Node>),
    HavingClause(Box<Node>),
    OrderClause(Vec<Node>),
    LimitClause(Limit),

    // Ordering
    Ascending(Box<Node>),
    Descending(Box<Node>),

    // Boolean logic
    Or(Binary),
    And(Binary),

    // Comparison
    Equals(Binary),
    NotEquals(Binary),
    Greater(Binary),
    Less(Binary),
    GreaterOrEquals(Binary),
    LessOrEquals(Binary),
    Is(Binary),
    IsNot(Binary),
    Like(Binary),
    NotLike(Binary),
    In(Binary),
    NotIn(Binary),

    // Range and list predicates
    Between(Between),
    NotBetween(Between),
    InValueList(Vec<Node>),
    Exists(Box<Node>),

    // Arithmetic
    Multiply(Binary),
    Divide(Binary),
    Add(Binary),
    Subtract(Binary),

    // Unary
    Not(Box<Node>),
    UnaryPlus(Box<Node>),
    UnaryMinus(Box<Node>),

    // Joins
    CrossJoin(Join),
    InnerJoin(QualifiedJoin),
    LeftJoin(QualifiedJoin),
    LeftOuterJoin(QualifiedJoin),
    RightJoin(QualifiedJoin),
    RightOuterJoin(QualifiedJoin),
    FullJoin(QualifiedJoin),
    FullOuterJoin(QualifiedJoin),
    On(Box<Node>),
    Using(Vec<Node>),

    // Identifiers
    Table(String),
    Column(String),
    QualifiedColumn(QualifiedColumn),
    As(As),

    Function(Function),

    // Aggregates
    Sum(Box<Node>),
    Minimum(Box<Node>),
    Maximum(Box<Node>),
    Average(Box<Node>),
    Count(Box<Node>),

    // Literals
    True,
    False,
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Date(String),
    DateTime(String),
}

impl Node {
    pub fn table(name: &str) -> Node {
        Node::Table(name.to_owned())
    }

    pub fn column(name: &str) -> Node {
        Node::Column(name.to_owned())
    }

    pub fn qualified_column(table: &str, column: &str) -> Node {
        Node::QualifiedColumn(QualifiedColumn {
            table: Box::new(Node::table(table)),
            column: Box::new(Node::column(column)),
        })
    }

    pub fn string(value: &str) -> Node {
        Node::String(value.to_owned())
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from(self)
    }

    /// Whether this node binds at the predicate tier (comparison, range,
    /// `NOT`) and so needs grouping when nested inside a tighter operator.
    pub(crate) fn is_predicate(&self) -> bool {
        matches!(
            self,
            Node::Equals(_)
                | Node::NotEquals(_)
                | Node::Greater(_)
                | Node::Less(_)
                | Node::GreaterOrEquals(_)
                | Node::LessOrEquals(_)
                | Node::Is(_)
                | Node::IsNot(_)
                | Node::Like(_)
                | Node::NotLike(_)
                | Node::In(_)
                | Node::NotIn(_)
                | Node::Between(_)
                | Node::NotBetween(_)
                | Node::Not(_)
        )
    }

    pub(crate) fn is_join(&self) -> bool {
        matches!(
            self,
            Node::CrossJoin(_)
                | Node::InnerJoin(_)
                | Node::LeftJoin(_)
                | Node::LeftOuterJoin(_)
                | Node::RightJoin(_)
                | Node::RightOuterJoin(_)
                | Node::FullJoin(_)
                | Node::FullOuterJoin(_)
        )
    }
}

impl From<Select> for Node {
    fn from(select: Select) -> Self {
        Node::Select(select)
    }
}

#[derive(PartialEq, Clone, Debug, EnumDiscriminants, Serialize, Deserialize)]
#[strum_discriminants(name(TokenTypeVariant))]
pub enum TokenType {
    LeftParen,
    RightParen,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    QuotedIdentifier(String),
    Identifier(String),
    String(String),
    Integer(String),
    Float(String),
    Eof,

    // Reserved Keywords
    And,
    As,
    Asc,
    Between,
    By,
    Cross,
    Date,
    Desc,
    Distinct,
    Exists,
    False,
    From,
    Full,
    Group,
    Having,
    In,
    Inner,
    Is,
    Join,
    Left,
    Like,
    Limit,
    Not,
    Null,
    Offset,
    On,
    Or,
    Order,
    Outer,
    Right,
    Select,
    True,
    Using,
    Where,
}

impl TokenTypeVariant {
    pub(crate) fn variant_str(&self) -> &str {
        match self {
            TokenTypeVariant::LeftParen => "(",
            TokenTypeVariant::RightParen => ")",
            TokenTypeVariant::Comma => ",",
            TokenTypeVariant::Dot => ".",
            TokenTypeVariant::Minus => "-",
            TokenTypeVariant::Plus => "+",
            TokenTypeVariant::Semicolon => ";",
            TokenTypeVariant::Slash => "/",
            TokenTypeVariant::Star => "*",
            TokenTypeVariant::Equal => "=",
            TokenTypeVariant::NotEqual => "<>",
            TokenTypeVariant::Greater => ">",
            TokenTypeVariant::GreaterEqual => ">=",
            TokenTypeVariant::Less => "<",
            TokenTypeVariant::LessEqual => "<=",
            TokenTypeVariant::QuotedIdentifier => "QuotedIdentifier",
            TokenTypeVariant::Identifier => "Identifier",
            TokenTypeVariant::String => "String",
            TokenTypeVariant::Integer => "Integer",
            TokenTypeVariant::Float => "Float",
            TokenTypeVariant::Eof => "EOF",

            // Reserved Keywords
            TokenTypeVariant::And => "AND",
            TokenTypeVariant::As => "AS",
            TokenTypeVariant::Asc => "ASC",
            TokenTypeVariant::Between => "BETWEEN",
            TokenTypeVariant::By => "BY",
            TokenTypeVariant::Cross => "CROSS",
            TokenTypeVariant::Date => "DATE",
            TokenTypeVariant::Desc => "DESC",
            TokenTypeVariant::Distinct => "DISTINCT",
            TokenTypeVariant::Exists => "EXISTS",
            TokenTypeVariant::False => "FALSE",
            TokenTypeVariant::From => "FROM",
            TokenTypeVariant::Full => "FULL",
            TokenTypeVariant::Group => "GROUP",
            TokenTypeVariant::Having => "HAVING",
            TokenTypeVariant::In => "IN",
            TokenTypeVariant::Inner => "INNER",
            TokenTypeVariant::Is => "IS",
            TokenTypeVariant::Join => "JOIN",
            TokenTypeVariant::Left => "LEFT",
            TokenTypeVariant::Like => "LIKE",
            TokenTypeVariant::Limit => "LIMIT",
            TokenTypeVariant::Not => "NOT",
            TokenTypeVariant::Null => "NULL",
            TokenTypeVariant::Offset => "OFFSET",
            TokenTypeVariant::On => "ON",
            TokenTypeVariant::Or => "OR",
            TokenTypeVariant::Order => "ORDER",
            TokenTypeVariant::Outer => "OUTER",
            TokenTypeVariant::Right => "RIGHT",
            TokenTypeVariant::Select => "SELECT",
            TokenTypeVariant::True => "TRUE",
            TokenTypeVariant::Using => "USING",
            TokenTypeVariant::Where => "WHERE",
        }
    }
}

/// Maps a lowercased word to its reserved keyword token, if any.
pub(crate) fn keyword(word: &str) -> Option<TokenType> {
    let kind = match word {
        "and" => TokenType::And,
        "as" => TokenType::As,
        "asc" => TokenType::Asc,
        "between" => TokenType::Between,
        "by" => TokenType::By,
        "cross" => TokenType::Cross,
        "date" => TokenType::Date,
        "desc" => TokenType::Desc,
        "distinct" => TokenType::Distinct,
        "exists" => TokenType::Exists,
        "false" => TokenType::False,
        "from" => TokenType::From,
        "full" => TokenType::Full,
        "group" => TokenType::Group,
        "having" => TokenType::Having,
        "in" => TokenType::In,
        "inner" => TokenType::Inner,
        "is" => TokenType::Is,
        "join" => TokenType::Join,
        "left" => TokenType::Left,
        "like" => TokenType::Like,
        "limit" => TokenType::Limit,
        "not" => TokenType::Not,
        "null" => TokenType::Null,
        "offset" => TokenType::Offset,
        "on" => TokenType::On,
        "or" => TokenType::Or,
        "order" => TokenType::Order,
        "outer" => TokenType::Outer,
        "right" => TokenType::Right,
        "select" => TokenType::Select,
        "true" => TokenType::True,
        "using" => TokenType::Using,
        "where" => TokenType::Where,
        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenType,
    pub lexeme: String,
    pub line: u32,
    pub col: u32,
}
