//! Command line tool for inference

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use bioner::{
    pipelines::{
        token_classification::{
            merge_entities, parse_tokens, BertNer, NerPipeline, DEFAULT_IGNORE_LABELS,
        },
        Pipeline,
    },
    server::{config::DEFAULT_TEXT, routes::EntityResponse},
    utils::logging,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer PIPELINE [TEXT] [OPTIONS]

Arguments:
  PIPELINE             The pipeline to use (e.g., 'ner')
  TEXT                 The text to analyze (defaults to a sample sentence)

Options:
  -h, --help           Print help
  -m, --model          The model to use (e.g., 'dmis-lab/biobert-base-cased-v1.1')
  -t, --tokens         Merge recorded pipeline output from a JSON file instead of running a model
  -d, --debug          Enable debug logging
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// The pipeline to use
    pipeline: String,

    /// The model to use
    model: Option<String>,

    /// Recorded token classification output
    tokens: Option<PathBuf>,

    /// Enable debug logging
    debug: bool,

    /// The text to analyze
    text: Option<String>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    let help = pargs.contains(["-h", "--help"]);
    let model = pargs.opt_value_from_str(["-m", "--model"])?;
    let tokens = pargs.opt_value_from_str(["-t", "--tokens"])?;
    let debug = pargs.contains(["-d", "--debug"]);

    if help {
        return Ok(Args {
            help,
            pipeline: String::new(),
            model,
            tokens,
            debug,
            text: None,
        });
    }

    let args = Args {
        help,
        model,
        tokens,
        debug,
        pipeline: pargs.free_from_str()?,
        text: pargs.opt_free_from_str()?,
    };

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    logging::init(args.debug);

    let pipeline = Pipeline::try_from(args.pipeline.as_str())?;

    let tokens = match args.tokens {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| anyhow!("Unable to read {}: {}", path.display(), e))?;
            parse_tokens(&json)?
        }
        None => {
            let model = args
                .model
                .unwrap_or_else(|| pipeline.default_model().to_string());
            let ignore_labels = DEFAULT_IGNORE_LABELS.iter().map(|l| l.to_string()).collect();
            let ner = BertNer::load(&model, ignore_labels).await?;
            let text = args.text.as_deref().unwrap_or(DEFAULT_TEXT);

            ner.run(text).await?
        }
    };

    let entities: Vec<EntityResponse> = merge_entities(&tokens)?
        .into_iter()
        .map(EntityResponse::from)
        .collect();

    println!("{}", serde_json::to_string_pretty(&entities)?);

    Ok(())
}
