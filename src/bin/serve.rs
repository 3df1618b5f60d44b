//! HTTP server returning the merged entities of a fixed sentence

use std::{path::PathBuf, sync::Arc};

use anyhow::anyhow;
use bioner::{
    pipelines::token_classification::BertNer,
    server::{self, AppState, ServerConfig},
    utils::logging,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: serve [OPTIONS]

Options:
  -h, --help           Print help
  -c, --config         Path to a YAML config file
  -m, --model          The model to use, a Hugging Face Hub name or a local directory
      --host           Interface to bind (defaults to '127.0.0.1')
  -p, --port           Port to bind (defaults to 5000)
  -d, --debug          Enable debug logging
";

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    model: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    debug: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            host: pargs.opt_value_from_str("--host")?,
            port: pargs.opt_value_from_str(["-p", "--port"])?,
            debug: pargs.contains(["-d", "--debug"]),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(args))
    }

    /// Layer the flags over the file config, or the defaults
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config.debug |= self.debug;

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let config = args.into_config()?;

    logging::init(config.debug);

    let pipeline = BertNer::load(&config.model, config.ignore_labels.clone()).await?;

    log::debug!("Model labels: {:?}", pipeline.labels());

    let state = Arc::new(AppState::new(Arc::new(pipeline), config.text.clone()));

    server::serve(&config, state).await
}
