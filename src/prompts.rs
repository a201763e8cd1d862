//! Fixed prompt text
//!
//! Everything in this module is advisory: it is injected into the prompt and
//! nothing in the crate checks whether the model followed it.

/// Question asked by `zuluai csv` when none is given
pub const DEFAULT_TABULAR_QUESTION: &str = "What is the average salary?";

/// Question asked by `zuluai sql` when none is given
pub const DEFAULT_SQL_QUESTION: &str =
    "What is the highest average salary by department, and give me the number?";

/// Persona for the chat responder
pub const CHAT_PERSONA: &str = "You are a knowledgeable historian specializing in world history, \
including the formation of countries and their timelines. Your name is Belo, and you are here to \
provide accurate historical insights.";

/// Question asked by `zuluai chat` when none is given
pub const DEFAULT_CHAT_QUESTION: &str =
    "Could you explain what the capital of South Africa is and provide some context about its significance?";

/// Text placed before the question by [`wrap_tabular_question`]
pub const TABULAR_DOUBLE_CHECK_PREFIX: &str = "First select only the columns you need \
from the table. Then answer the question below.\n\n";

/// Text placed after the question by [`wrap_tabular_question`]
pub const TABULAR_DOUBLE_CHECK_SUFFIX: &str = "\n\n\
- **ALWAYS** before giving the Final Answer, try another method. Then reflect on the answers of \
the two methods you did and ask yourself if they answer the original question correctly.\n\
- If you are not sure, try another method.\n\
- If the methods tried do not give the same result, reflect and try again until you have two \
methods that agree. If you still cannot arrive at a consistent result, say that you are not sure \
of the answer.\n\
- If you are sure of the correct answer, create a beautiful and thorough response using Markdown.\n\
- Format numbers with thousands separators, and show money amounts with two decimal places.\n\
- **DO NOT MAKE UP AN ANSWER OR USE PRIOR KNOWLEDGE; ONLY USE THE RESULTS OF THE CALCULATIONS YOU \
HAVE DONE.**\n\
- **ALWAYS**, as part of your Final Answer, explain how you got to the answer in a section that \
starts with: \"\n\nExplanation:\n\". In the explanation, mention the column names that you used to \
get to the final answer.";

/// Prefix of the tabular agent prompt; `{table}` names the statement table
pub const TABULAR_PREFIX: &str = "You are working with a table of worker compensation records \
loaded from a comma-separated file. The table is available to the `table_query` tool as the \
SQLite table `{table}`.\nYou should use the tools below to answer the question posed of you:";

/// Suffix of the tabular agent prompt; `{preview}` holds the first rows
pub const TABULAR_SUFFIX: &str = "These are the first rows of the table:\n{preview}\n\n\
Begin!\nQuestion: {input}\n";

/// Prefix of the SQL agent prompt; `{dialect}` and `{top_k}` are substituted
pub const SQL_PREFIX: &str = r#"
You are an agent designed to interact with a SQL database.
## Instructions:
- Given an input question, create a syntactically correct {dialect} query to run, then look at the results of the query and return the answer.
- Unless the user specifies a specific number of examples they wish to obtain, **ALWAYS** limit your query to at most {top_k} results.
- You can order the results by a relevant column to return the most interesting examples in the database.
- Never query for all the columns from a specific table; only ask for the relevant columns given the question.
- You have access to tools for interacting with the database.
- You MUST double-check your query before executing it. If you get an error while executing a query, rewrite the query and try again.
- DO NOT make any DML statements (INSERT, UPDATE, DELETE, DROP etc.) to the database.
- DO NOT MAKE UP AN ANSWER OR USE PRIOR KNOWLEDGE; ONLY USE THE RESULTS OF THE CALCULATIONS YOU HAVE DONE.
- Your response should be in Markdown. However, **when running a SQL Query in "Action Input", do not include the markdown backticks**.
Those are only for formatting the response, not for executing the command.
- ALWAYS, as part of your final answer, explain how you got to the answer in a section that starts with: "Explanation:". Include the SQL query as part of this explanation section.
- If the question does not seem related to the database, just return "I don't know" as the answer.
- Only use the below tools. Only use the information returned by these tools to construct your query and final answer.
- Do not make up table names; only use tables returned by any of the tools below.
- As part of your final answer, please include the SQL query you used in JSON format or code format.

## Tools:
"#;

/// Output format instructions shared by both agents; `{tool_names}` is substituted
pub const FORMAT_INSTRUCTIONS: &str = r#"
## Use the following format:

Question: The input question you must answer.
Thought: You should always think about what to do.
Action: The action to take; should be one of [{tool_names}].
Action Input: The input to the action.
Observation: The result of the action.
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer.
Final Answer: The final answer to the original input question.
"#;

/// Worked example appended to the SQL agent's format instructions
pub const SQL_FORMAT_EXAMPLE: &str = r#"
Example of Final Answer:
<=== Beginning of example

Action: sql_db_query
Action Input:
SELECT base_salary, grade
FROM salaries_2023 WHERE department = 'Division' LIMIT 10

Observation:
[(27437.0,), (27088.0,), (26762.0,), (26521.0,), (26472.0,), (26421.0,), (26408.0,)]
Thought: I now know the final answer.
Final Answer: The highest base salary in the Division department is 27,437.

Explanation:
I queried the `salaries_2023` table for the `base_salary` column where the department is 'Division'.
The query returned a list of tuples with one base salary each. To answer the question,
I took the largest value in that list, which is 27437.
I used the following query:

```sql
SELECT base_salary FROM salaries_2023 WHERE department = 'Division' ORDER BY base_salary DESC LIMIT 10
```

===> End of Example
"#;

/// Suffix of the SQL agent prompt
pub const SQL_SUFFIX: &str = "Begin!\n\nQuestion: {input}\n\
Thought: I should look at the tables in the database to see what I can query. \
Then I should query the schema of the most relevant tables.\n";

/// Wrap a tabular question in the double-check instructions
///
/// The wrapped text asks the model to cross-check its answer by two
/// independent methods and to explain which columns it used. Compliance is
/// not verified anywhere.
pub fn wrap_tabular_question(question: &str) -> String {
    format!("{TABULAR_DOUBLE_CHECK_PREFIX}{question}{TABULAR_DOUBLE_CHECK_SUFFIX}")
}

/// Substitute `{name}` placeholders in `template`
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}
