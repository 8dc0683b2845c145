use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::sync::Arc;
use veritext::models::DetectResponse;
use veritext::services::detection::{
    analyze_document, split_windows, summarize, tokenize_text, AnalysisOptions, RemoteClassifier,
};
use veritext::services::text_processor::{
    below_minimum_words, character_count, normalize_punctuation, word_count, MIN_DETECTION_WORDS,
};
use veritext::services::tokenizer::detokenize;
use veritext::services::vocab::Vocabulary;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  analyze_text <path.txt> --vocab <vocab.txt> [--endpoint <url>] [--tokenize] [--normalize] [--max-len <n>] [--overlap <n>] [--windows <n>] [--out <json_path>]\n\nNotes:\n  - `--tokenize` dumps the tokenization inspection view and window previews without calling the model.\n  - The model endpoint defaults to VERITEXT_INFER_URL or the local server.\n  - Detection rejects inputs shorter than {} whitespace-delimited words.",
            MIN_DETECTION_WORDS
        );
        return Ok(());
    }

    veritext::init_logging();

    let path = args[1].clone();
    let vocab_path = parse_arg_value(&args, "--vocab").unwrap_or_else(|| "vocab.txt".to_string());
    let endpoint = parse_arg_value(&args, "--endpoint");
    let max_len: usize = parse_arg_value(&args, "--max-len")
        .and_then(|s| s.parse().ok())
        .unwrap_or(256);
    let overlap: usize = parse_arg_value(&args, "--overlap")
        .and_then(|s| s.parse().ok())
        .unwrap_or(128);
    let windows_n: usize = parse_arg_value(&args, "--windows")
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    let tokenize_only = has_flag(&args, "--tokenize");
    let do_normalize = has_flag(&args, "--normalize");
    let out_path = parse_arg_value(&args, "--out");

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read input file {}", path))?;
    let text = if do_normalize {
        normalize_punctuation(&raw)
    } else {
        raw
    };

    let vocab = Vocabulary::from_file(&vocab_path)?;
    let options = AnalysisOptions { max_len, overlap };

    println!("File: {}", path);
    println!("Vocabulary: {} entries from {}", vocab.len(), vocab_path);
    println!(
        "Input: {} words, {} characters",
        word_count(&text),
        character_count(&text)
    );
    println!("Window geometry: max_len={} overlap={}", max_len, overlap);
    println!();

    if tokenize_only {
        let inspection = tokenize_text(&vocab, &text)?;
        println!("Tokens: {}", inspection.stats.token_count);
        for (i, (tok, id)) in inspection
            .tokens
            .iter()
            .zip(&inspection.token_ids)
            .take(40)
            .enumerate()
        {
            println!("[T{:04}] id={:<6} {}", i, id, tok);
        }
        if inspection.tokens.len() > 40 {
            println!("... ({} more tokens)", inspection.tokens.len() - 40);
        }
        println!();

        let windows = split_windows(&vocab, &inspection.token_ids, max_len, overlap)?;
        println!("Windows: {}", windows.len());
        for (i, w) in windows.iter().take(windows_n).enumerate() {
            println!(
                "[W{:03}] content={}  {}",
                i,
                w.content_len(),
                preview(&detokenize(&vocab, &w.ids), 100)
            );
        }
        if windows.len() > windows_n {
            println!("... ({} more windows)", windows.len() - windows_n);
        }

        if let Some(out_path) = out_path {
            let json = serde_json::to_string_pretty(&inspection)?;
            std::fs::write(&out_path, json)
                .with_context(|| format!("cannot write {}", out_path))?;
            println!();
            println!("Wrote JSON: {}", out_path);
        }
        return Ok(());
    }

    // Detection boundary: short inputs give statistically unreliable
    // single-window verdicts, so they are rejected before tokenization.
    if below_minimum_words(&text) {
        bail!(
            "input has {} words; at least {} are required for a reliable verdict",
            word_count(&text),
            MIN_DETECTION_WORDS
        );
    }

    let classifier = match endpoint {
        Some(url) => RemoteClassifier::with_endpoint(&url),
        None => RemoteClassifier::new(),
    };
    println!("Model endpoint: {}", classifier.endpoint());
    classifier.health().await?;

    let result = analyze_document(&vocab, Arc::new(classifier), &text, &options).await?;
    let response = summarize(&result)?;

    println!();
    println!("Result: {}", response.result);
    println!("AI probability: {:.4}", response.ai_probability);
    println!("AI percentage: {:.2}%", response.ai_percentage);
    println!("Confidence: {}", response.confidence);
    println!(
        "Stats: {} words, {} characters, {} windows",
        response.stats.word_count,
        response.stats.character_count,
        result.per_window_probabilities.len()
    );
    for (i, p) in result
        .per_window_probabilities
        .iter()
        .take(windows_n)
        .enumerate()
    {
        println!("[W{:03}] p={:.4}", i, p);
    }
    if result.per_window_probabilities.len() > windows_n {
        println!(
            "... ({} more windows)",
            result.per_window_probabilities.len() - windows_n
        );
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        struct Output {
            file: String,
            response: DetectResponse,
            per_window_probabilities: Vec<f64>,
        }

        let out = Output {
            file: path.clone(),
            response,
            per_window_probabilities: result.per_window_probabilities.clone(),
        };

        let json = serde_json::to_string_pretty(&out)?;
        std::fs::write(&out_path, json).with_context(|| format!("cannot write {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
