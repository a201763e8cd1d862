//! Natural-language-to-SQL agent
//!
//! Four tools over one relational store: list tables, describe tables, check
//! a query and run a query. The instructions to stay read-only and to limit
//! result sizes live in the prompt; the tools do not enforce them.

use std::rc::Rc;

use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use super::executor::{AgentExecutor, PromptTemplate, DEFAULT_MAX_ITERATIONS};
use super::tools::{clean_tool_input, Tool};
use crate::error::AgentResult;
use crate::llm::ChatModel;
use crate::prompts;
use crate::relational::RelationalStore;

/// Options for [`create_sql_agent`]
#[derive(Debug, Clone)]
pub struct SqlAgentOptions {
    /// Default row limit the prompt asks for
    pub top_k: usize,
    /// Dialect named in the prompt
    pub dialect: String,
    pub max_iterations: usize,
    pub handle_parsing_errors: bool,
}

impl Default for SqlAgentOptions {
    fn default() -> Self {
        Self {
            top_k: 30,
            dialect: "sqlite".to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            handle_parsing_errors: false,
        }
    }
}

/// Runs a statement and returns the rows
pub struct QuerySqlTool {
    store: Rc<RelationalStore>,
}

impl Tool for QuerySqlTool {
    fn name(&self) -> &str {
        "sql_db_query"
    }

    fn description(&self) -> &str {
        "Input to this tool is a detailed and correct SQL query, output is a result from the \
         database. If the query is not correct, an error message will be returned. If an error \
         is returned, rewrite the query, check the query, and try again. If you encounter an \
         issue with Unknown column 'xxxx' in 'field list', use sql_db_schema to query the \
         correct table fields."
    }

    fn run(&self, input: &str) -> AgentResult<String> {
        self.store.run(&clean_tool_input(input))
    }
}

/// Describes tables: schema plus sample rows
pub struct InfoSqlTool {
    store: Rc<RelationalStore>,
}

impl Tool for InfoSqlTool {
    fn name(&self) -> &str {
        "sql_db_schema"
    }

    fn description(&self) -> &str {
        "Input to this tool is a comma-separated list of tables, output is the schema and sample \
         rows for those tables. Be sure that the tables actually exist by calling \
         sql_db_list_tables first! Example Input: table1, table2, table3"
    }

    fn run(&self, input: &str) -> AgentResult<String> {
        let cleaned = clean_tool_input(input);
        let tables: Vec<&str> = cleaned
            .split(',')
            .map(|t| t.trim().trim_matches('"'))
            .filter(|t| !t.is_empty())
            .collect();
        self.store.table_info(&tables)
    }
}

/// Lists the tables in the store
pub struct ListSqlTablesTool {
    store: Rc<RelationalStore>,
}

impl Tool for ListSqlTablesTool {
    fn name(&self) -> &str {
        "sql_db_list_tables"
    }

    fn description(&self) -> &str {
        "Input is an empty string, output is a comma-separated list of tables in the database."
    }

    fn run(&self, _input: &str) -> AgentResult<String> {
        Ok(self.store.table_names()?.join(", "))
    }
}

/// Parses a statement before it is run
///
/// Reports syntax errors and statements that are not read-only queries.
/// It advises; it never blocks [`QuerySqlTool`].
pub struct QuerySqlCheckerTool;

impl Tool for QuerySqlCheckerTool {
    fn name(&self) -> &str {
        "sql_db_query_checker"
    }

    fn description(&self) -> &str {
        "Use this tool to double check if your query is correct before executing it. Always use \
         this tool before executing a query with sql_db_query!"
    }

    fn run(&self, input: &str) -> AgentResult<String> {
        let query = clean_tool_input(input);
        let statements = Parser::parse_sql(&SQLiteDialect {}, &query)?;

        if statements.is_empty() {
            return Ok("No statement found in the input.".to_string());
        }
        if statements.len() > 1 {
            return Ok(format!(
                "The input holds {} statements; sql_db_query runs only one at a time.",
                statements.len()
            ));
        }
        if !matches!(statements[0], Statement::Query(_)) {
            return Ok(format!(
                "The statement parses but it is not a read-only query. \
                 Rewrite it as a SELECT:\n{query}"
            ));
        }

        Ok(query)
    }
}

/// Build an agent that answers questions by querying `store`
pub fn create_sql_agent(
    model: Box<dyn ChatModel>,
    store: RelationalStore,
    options: SqlAgentOptions,
) -> AgentExecutor {
    let store = Rc::new(store);
    let tools: Vec<Box<dyn Tool>> = vec![
        Box::new(QuerySqlTool {
            store: Rc::clone(&store),
        }),
        Box::new(InfoSqlTool {
            store: Rc::clone(&store),
        }),
        Box::new(ListSqlTablesTool {
            store: Rc::clone(&store),
        }),
        Box::new(QuerySqlCheckerTool),
    ];

    let top_k = options.top_k.to_string();
    let template = PromptTemplate {
        prefix: prompts::render(
            prompts::SQL_PREFIX,
            &[("dialect", options.dialect.as_str()), ("top_k", top_k.as_str())],
        ),
        format_instructions: format!(
            "{}{}",
            prompts::FORMAT_INSTRUCTIONS,
            prompts::SQL_FORMAT_EXAMPLE
        ),
        suffix: prompts::SQL_SUFFIX.to_string(),
    };

    AgentExecutor::new(model, tools, template)
        .with_max_iterations(options.max_iterations)
        .with_handle_parsing_errors(options.handle_parsing_errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_accepts_select() {
        let out = QuerySqlCheckerTool
            .run("SELECT grade, AVG(base_salary) FROM salaries_2023 GROUP BY grade LIMIT 30")
            .unwrap();
        assert!(out.starts_with("SELECT grade"));
    }

    #[test]
    fn test_checker_flags_mutation() {
        let out = QuerySqlCheckerTool.run("DELETE FROM salaries_2023").unwrap();
        assert!(out.contains("not a read-only query"));
    }

    #[test]
    fn test_checker_reports_syntax_error() {
        assert!(QuerySqlCheckerTool.run("SELEC grade FROM").is_err());
    }
}
