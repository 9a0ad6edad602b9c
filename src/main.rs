use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::anyhow;
use clap::Parser as ClapParser;
use clap::Subcommand;
use indexmap::IndexMap;
use serde::Serialize;
use sqltree::ast::Select;
use sqltree::parser::parse_sql;

#[derive(clap::Parser)]
#[command(name = "sqltree")]
#[command(about = "SQL SELECT parser and formatter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the syntax tree of one or more SQL files as JSON.
    Parse(ParseCommand),
    /// Print the canonical SQL of one or more SQL files.
    Format(FormatCommand),
}

#[derive(clap::Args)]
struct ParseCommand {
    /// Path to the SQL file or directory containing SQL files.
    #[arg(value_name = "SQL_[FILE|DIR]")]
    sql: PathBuf,
    /// Pretty-print the output syntax tree.
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args)]
struct FormatCommand {
    /// Path to the SQL file or directory containing SQL files.
    #[arg(value_name = "SQL_[FILE|DIR]")]
    sql: PathBuf,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutAst {
    Ok(Select),
    ErrAst { error: String },
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutSql {
    Ok { sql: String },
    ErrSql { error: String },
}

fn read_sql(sql_file_path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(sql_file_path)
        .map_err(|_| anyhow!("Failed to read sql file {}", sql_file_path.display()))
}

fn sql_files_in_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut sql_in_dir: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|res| res.ok())
        .map(|entry| entry.path())
        .filter(|file| file.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    sql_in_dir.sort();
    Ok(sql_in_dir)
}

fn output_ast(sql_file_path: &Path) -> anyhow::Result<OutAst> {
    let sql = read_sql(sql_file_path)?;
    let out_ast = match parse_sql(&sql) {
        Ok(select) => OutAst::Ok(select),
        Err(err) => OutAst::ErrAst {
            error: format!(
                "Could not parse SQL in file {} due to error: {}",
                sql_file_path.display(),
                err
            ),
        },
    };
    Ok(out_ast)
}

fn output_sql(sql_file_path: &Path) -> anyhow::Result<OutSql> {
    let sql = read_sql(sql_file_path)?;
    let out_sql = match parse_sql(&sql) {
        Ok(select) => OutSql::Ok {
            sql: select.to_sql(),
        },
        Err(err) => OutSql::ErrSql {
            error: format!(
                "Could not parse SQL in file {} due to error: {}",
                sql_file_path.display(),
                err
            ),
        },
    };
    Ok(out_sql)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let out_str = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out_str)
}

fn run_parse(parse_command: &ParseCommand) -> anyhow::Result<String> {
    let sql_file_or_dir = &parse_command.sql;
    if sql_file_or_dir.is_dir() {
        let mut file_asts: IndexMap<String, OutAst> = IndexMap::new();
        for sql_file in sql_files_in_dir(sql_file_or_dir)? {
            let out_ast = output_ast(&sql_file)?;
            file_asts.insert(
                std::path::absolute(&sql_file)?.display().to_string(),
                out_ast,
            );
        }
        to_json(&file_asts, parse_command.pretty)
    } else {
        to_json(&output_ast(sql_file_or_dir)?, parse_command.pretty)
    }
}

fn run_format(format_command: &FormatCommand) -> anyhow::Result<String> {
    let sql_file_or_dir = &format_command.sql;
    if sql_file_or_dir.is_dir() {
        let mut file_sqls: IndexMap<String, OutSql> = IndexMap::new();
        for sql_file in sql_files_in_dir(sql_file_or_dir)? {
            let out_sql = output_sql(&sql_file)?;
            file_sqls.insert(
                std::path::absolute(&sql_file)?.display().to_string(),
                out_sql,
            );
        }
        to_json(&file_sqls, true)
    } else {
        match output_sql(sql_file_or_dir)? {
            OutSql::Ok { sql } => Ok(sql),
            OutSql::ErrSql { error } => Err(anyhow!(error)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let now = Instant::now();

    env_logger::init();
    let cli = Cli::parse();

    let out_str = match &cli.command {
        Commands::Parse(parse_command) => run_parse(parse_command)?,
        Commands::Format(format_command) => run_format(format_command)?,
    };
    println!("{}", out_str);

    let elapsed = now.elapsed();
    log::info!("Elapsed: {:.2?}", elapsed);

    Ok(())
}
