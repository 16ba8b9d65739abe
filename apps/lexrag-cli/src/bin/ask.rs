use std::env;
use std::io::{self, BufRead, Write};

use lexrag_cli::args::AskArgs;
use lexrag_cli::{bootstrap, logging, render};
use lexrag_core::config::Config;

fn usage(program: &str) {
    eprintln!(
        "Usage: {program} [question] [--json] [--top-k N] [--threshold X] [--max-results N]"
    );
    eprintln!("Example: {program} '盗窃多少钱会被判刑？' --max-results 3");
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("lexrag-ask", String::as_str).to_string();
    let parsed = match AskArgs::parse(args.get(1..).unwrap_or_default()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            usage(&program);
            std::process::exit(2);
        }
    };
    if parsed.help {
        usage(&program);
        return Ok(());
    }

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    let params = parsed.retrieval_params(settings.retrieval);

    let mut question = parsed.question.clone();
    if question.trim().is_empty() {
        print!("{}", render::QUESTION_PROMPT);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        question = line.trim().to_string();
    }
    if question.is_empty() {
        usage(&program);
        std::process::exit(1);
    }

    let service = bootstrap::build_service(&settings)?;
    let response = service.ask_with(&question, &params)?;
    if parsed.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render::console(&response));
    }
    Ok(())
}
