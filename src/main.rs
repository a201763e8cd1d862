//! zuluai - natural-language questions over a salary CSV file
//!
//! # Program Flow
//!
//! Every subcommand runs the same strict sequence:
//!
//! 1. Parse command-line arguments and install logging
//! 2. Read the model-service credential (fail before any file I/O)
//! 3. Load the input file (csv, sql) and mirror it into SQLite (sql)
//! 4. Build the model client and the agent
//! 5. Ask one question and print the answer, or serve the web form, or run
//!    the interactive chat loop

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use tracing::{debug, info};

use zuluai::agent::{create_sql_agent, create_tabular_agent, SqlAgentOptions, TabularAgentOptions};
use zuluai::chat::{self, ChatLoop, ChatResponder, EditorSource, ReaderSource};
use zuluai::cli::{self, ChatArgs, Command, CsvArgs, SqlArgs};
use zuluai::config::{AppConfig, ModelSettings};
use zuluai::credentials::{self, Credential, API_KEY_VAR};
use zuluai::dataset::load_dataset;
use zuluai::llm::{AnthropicChat, Message};
use zuluai::relational::RelationalStore;
use zuluai::web::FormServer;
use zuluai::{logging, prompts};

const FORM_TITLE: &str = "ZuluAI";

fn main() -> Result<()> {
    // Step 1: arguments and logging
    let args = cli::parse_args()?;
    logging::init(args.verbose, &args.log_level);

    // Step 2: the credential is a precondition for every entry point
    credentials::load_dotenv();
    let credential = Credential::from_env(API_KEY_VAR)?;

    let config = AppConfig::new(
        args.verbose,
        ModelSettings {
            model: args.model.clone(),
            temperature: args.temperature,
            max_tokens: args.max_tokens,
            base_url: args.base_url.clone(),
        },
        args.data_path().cloned().unwrap_or_default(),
        args.max_iterations,
    );
    if config.verbose() {
        debug!("Arguments: {args:?}");
    }

    match &args.command {
        Command::Csv(csv_args) => run_csv(&config, credential, csv_args),
        Command::Chat(chat_args) => run_chat(&config, credential, chat_args),
        Command::Sql(sql_args) => run_sql(&config, credential, sql_args),
    }
}

fn build_model(config: &AppConfig, credential: Credential) -> Result<AnthropicChat> {
    AnthropicChat::new(config.model().clone(), credential).context("Error initializing model")
}

fn run_csv(config: &AppConfig, credential: Credential, args: &CsvArgs) -> Result<()> {
    let model = build_model(config, credential)?;
    let dataset = load_dataset(config.data_path()).context("Error loading dataset")?;

    let options = TabularAgentOptions {
        allow_dangerous_code: true,
        max_iterations: config.max_iterations(),
        ..TabularAgentOptions::default()
    };
    let agent = create_tabular_agent(Box::new(model), &dataset, options)
        .context("Error creating tabular agent")?;

    let double_check = args.double_check;
    let prepare = move |question: &str| {
        if double_check {
            prompts::wrap_tabular_question(question)
        } else {
            question.to_string()
        }
    };

    if let Some(addr) = &args.serve {
        let mut server = FormServer::new(
            FORM_TITLE,
            "CSV Query AI Agent",
            Box::new(move |question: &str| agent.invoke(&prepare(question)).map(|res| res.output)),
        );
        return server.serve(addr).context("Error serving form");
    }

    let question = args
        .question
        .as_deref()
        .unwrap_or(prompts::DEFAULT_TABULAR_QUESTION);
    info!("Question: {question}");
    let res = agent
        .invoke(&prepare(question))
        .context("Error running the agent")?;
    println!("Agent response: {}", res.output);
    Ok(())
}

fn run_chat(config: &AppConfig, credential: Credential, args: &ChatArgs) -> Result<()> {
    let model = build_model(config, credential)?;
    let responder = ChatResponder::new(Box::new(model));

    if args.interactive {
        let chat_loop = ChatLoop::new(responder);
        let mut out = io::stdout().lock();
        let answered = if io::stdin().is_terminal() {
            let mut source = EditorSource::new().context("Error opening terminal")?;
            chat_loop.run(&mut source, &mut out)
        } else {
            let mut source = ReaderSource::new(io::stdin().lock());
            chat_loop.run(&mut source, &mut out)
        };
        answered.context("Error running the chat loop")?;
        return Ok(());
    }

    let messages = match &args.question {
        Some(question) => vec![
            Message::system(prompts::CHAT_PERSONA),
            Message::human(question.as_str()),
        ],
        None => chat::default_conversation(),
    };
    let response = responder
        .respond(&messages)
        .context("Error invoking the model")?;
    println!("Response from model: {}", response.content);
    Ok(())
}

fn run_sql(config: &AppConfig, credential: Credential, args: &SqlArgs) -> Result<()> {
    let model = build_model(config, credential)?;
    let dataset = load_dataset(config.data_path()).context("Error loading dataset")?;
    let store = RelationalStore::materialize(&args.db, &dataset, &args.table)
        .context("Error writing the relational store")?;

    let options = SqlAgentOptions {
        top_k: args.top_k,
        max_iterations: config.max_iterations(),
        ..SqlAgentOptions::default()
    };
    let agent = create_sql_agent(Box::new(model), store, options);

    if let Some(addr) = &args.serve {
        let mut server = FormServer::new(
            FORM_TITLE,
            "SQL Query AI Agent",
            Box::new(move |question: &str| agent.invoke(question).map(|res| res.output)),
        );
        return server.serve(addr).context("Error serving form");
    }

    let question = args.question.as_deref().unwrap_or(prompts::DEFAULT_SQL_QUESTION);
    info!("Question: {question}");
    let res = agent.invoke(question).context("Error running the agent")?;
    println!("{}", res.output);
    Ok(())
}
