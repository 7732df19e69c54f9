use anyhow::Result;
use ask360::{Answer, Assistant};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ask360")]
#[command(about = "FreshFoods Yogurt Insights Assistant")]
struct Args {
    /// The question to answer; starts an interactive session when omitted
    question: Vec<String>,

    /// Seed for the synthetic data generators
    #[arg(long, default_value_t = ask360::data::DEFAULT_SEED)]
    seed: u64,

    /// Directory trend charts are written to
    #[arg(long, default_value = "charts")]
    chart_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let assistant = Assistant::new()
        .with_seed(args.seed)
        .with_chart_dir(args.chart_dir);

    if !args.question.is_empty() {
        let question = args.question.join(" ");
        let answer = assistant.answer(&question)?;
        print_answer(&answer);
        return Ok(());
    }

    println!("Ask360 - FreshFoods Yogurt Insights");
    println!("Type 'exit' or 'quit' to exit.\n");

    let stdin = io::stdin();
    loop {
        print!("ask360> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match assistant.answer(question) {
            Ok(answer) => {
                print_answer(&answer);
                println!();
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

fn print_answer(answer: &Answer) {
    println!("\nIntent: {}", answer.intent);

    println!("\nQuery Metadata:");
    println!("  Data Sources:");
    for source in &answer.metadata.data_sources {
        println!("    - {}", source);
    }
    if let Some(time_range) = &answer.metadata.time_range {
        println!("  Time Range: {}", time_range);
    }
    if !answer.metadata.regions.is_empty() {
        println!("  Regions:");
        for region in &answer.metadata.regions {
            println!("    - {}", region);
        }
    }
    if !answer.metadata.filters.is_empty() {
        println!("  Filters:");
        for filter in &answer.metadata.filters {
            println!("    - {}", filter);
        }
    }

    if !answer.kpis.is_empty() {
        println!("\nKPIs:");
        for kpi in &answer.kpis {
            println!("  {}: {}", kpi.label, kpi.value);
        }
    }

    println!("\nSummary:");
    for line in &answer.text {
        println!("  {}", line);
    }

    if let Some(first_row) = answer.table.first().and_then(|r| r.as_object()) {
        let keys: Vec<&String> = first_row.keys().collect();
        println!("\nTable:");
        println!(
            "  {}",
            keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(" | ")
        );
        println!("  {}", "-".repeat(50));
        for row in answer.table.iter().take(10) {
            if let Some(row) = row.as_object() {
                let cells: Vec<String> = keys
                    .iter()
                    .map(|k| match row.get(*k) {
                        Some(serde_json::Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                        None => String::new(),
                    })
                    .collect();
                println!("  {}", cells.join(" | "));
            }
        }
    }

    println!("\nQuery:\n{}", answer.sql_query);

    if let Some(chart_path) = &answer.chart_path {
        println!("\nChart saved to: {}", chart_path);
    }
}
