//! # sqltree
//!
//! A library for parsing SQL `SELECT` statements into a strongly-typed syntax tree.
//!
//! # Features
//!
//! - Parse a single `SELECT` statement (joins, subqueries, grouping, ordering, limits) into an AST.
//! - Report lexical and syntactic errors with line, column and the expected tokens.
//! - Walk the tree in pre-order with [`visit`] and rewrite it with [`map`].
//! - Render any tree back to canonical SQL with [`to_sql`]; the output parses back to the same tree.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqltree::{ast::Node, map, parse, to_sql, visit};
//!
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!
//!     let sql = r#"
//!         select c.name, count(*) as orders
//!         from customers c left join orders o on o.customer_id = c.id
//!         where o.created_at >= date '2024-01-01'
//!         group by c.name
//!         order by orders desc
//!         limit 10
//!     "#;
//!     let select = parse(sql)?;
//!     let tree = Node::from(select);
//!
//!     let mut tables = vec![];
//!     visit(&tree, |node| {
//!         if let Node::Table(name) = node {
//!             tables.push(name.clone());
//!         }
//!     });
//!     println!("Tables: {:?}", tables);
//!
//!     let renamed = map(&tree, |node| match node {
//!         Node::Table(name) if name == "orders" => Some(Node::table("orders_2024")),
//!         _ => None,
//!     });
//!     println!("{}", to_sql(&renamed));
//!     Ok(())
//! }
//! ```
pub mod ast;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod test_utils;
pub mod unparser;
pub mod visitor;

pub use error::{Error, LexError, ParseError};
pub use parser::parse_sql as parse;
pub use unparser::to_sql;
pub use visitor::{map, visit};
